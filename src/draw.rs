//! Pixel-level drawing onto RGB overlay images.
//!
//! These are the primitive strokes the compositor and the vector tools
//! paint with: filled discs and rings for points and cursors, Bresenham
//! lines for segments, solid mask fills and weighted blends for the
//! translucent overlay composition.
//!
//! All operations clip to image bounds; out-of-range coordinates are
//! silently skipped.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// Set a single pixel, clipped to bounds.
#[inline]
pub fn put_pixel(image: &mut Array3<u8>, x: i32, y: i32, color: [u8; 3]) {
    let (height, width, _) = image.dim();
    if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
        for c in 0..3 {
            image[[y as usize, x as usize, c]] = color[c];
        }
    }
}

/// Draw a filled disc of the given radius at `center` (`(x, y)`).
pub fn fill_disc(image: &mut Array3<u8>, center: (i32, i32), radius: i32, color: [u8; 3]) {
    let r_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r_sq {
                put_pixel(image, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Draw a circle outline of the given radius and stroke thickness.
pub fn stroke_circle(
    image: &mut Array3<u8>,
    center: (i32, i32),
    radius: i32,
    thickness: i32,
    color: [u8; 3],
) {
    let outer_sq = radius * radius;
    let inner = (radius - thickness).max(0);
    let inner_sq = inner * inner;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d_sq = dx * dx + dy * dy;
            if d_sq <= outer_sq && d_sq >= inner_sq {
                put_pixel(image, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Draw a 1-px line between two points using Bresenham's algorithm.
pub fn stroke_line(image: &mut Array3<u8>, a: (i32, i32), b: (i32, i32), color: [u8; 3]) {
    let (mut x, mut y) = a;
    let (x1, y1) = b;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Paint every set cell of a binary mask with a solid color.
pub fn fill_region(image: &mut Array3<u8>, mask: ArrayView2<u8>, color: [u8; 3]) {
    let (height, width, _) = image.dim();
    debug_assert_eq!((height, width), mask.dim());

    for y in 0..height {
        for x in 0..width {
            if mask[[y, x]] > 0 {
                for c in 0..3 {
                    image[[y, x, c]] = color[c];
                }
            }
        }
    }
}

/// Per-pixel weighted blend of two images: `wa * a + wb * b`.
pub fn blend_weighted(a: ArrayView3<u8>, wa: f32, b: ArrayView3<u8>, wb: f32) -> Array3<u8> {
    let (height, width, channels) = a.dim();
    debug_assert_eq!(a.dim(), b.dim());
    let mut out = Array3::<u8>::zeros((height, width, channels));

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let v = wa * a[[y, x, c]] as f32 + wb * b[[y, x, c]] as f32;
                out[[y, x, c]] = v.clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// Lift a grayscale slice to an RGB image (R = G = B = intensity).
pub fn gray_to_rgb(image: ArrayView2<u8>) -> Array3<u8> {
    let (height, width) = image.dim();
    let mut out = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let v = image[[y, x]];
            for c in 0..3 {
                out[[y, x, c]] = v;
            }
        }
    }
    out
}
