//! Seeded region growing over the source intensity image.
//!
//! Grows a binary mask outward from seed pixels, admitting neighbors whose
//! intensity stays within a tolerance of the seed. Seeds are either placed
//! explicitly (magic wand) or derived from the boundary of the painted
//! positive mask; painted negative strokes act as hard barriers the fill
//! cannot cross.
//!
//! The grown mask is transient derived state: recomputed in full on every
//! seed or tolerance change, never the source of truth for annotation.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

use crate::contour::{extract_contours, ExtractionMode};

/// Largest accepted tolerance. Source intensities are halved to 0..=127
/// before filling, so any tolerance in this range keeps the 255-valued
/// negative barrier unreachable.
pub const TOLERANCE_MAX: u8 = 127;

/// Enclosed pockets of the grown mask up to this area are merged into it.
pub const SMALL_HOLE_AREA: usize = 10;

/// Pixel neighborhood used by the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Connectivity::Eight => &[
                (-1, 0),
                (1, 0),
                (0, -1),
                (0, 1),
                (-1, -1),
                (1, -1),
                (-1, 1),
                (1, 1),
            ],
        }
    }
}

/// Flood fill behavior, one named field per semantic option.
#[derive(Debug, Clone, Copy)]
pub struct FloodFillOptions {
    /// Neighborhood used when expanding the fill front.
    pub connectivity: Connectivity,
    /// Measure intensity deviation against the seed pixel (fixed range)
    /// instead of against the neighbor currently being expanded.
    pub fixed_range: bool,
}

impl Default for FloodFillOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Four,
            fixed_range: true,
        }
    }
}

/// Flood fill a single seed over an intensity image.
///
/// A pixel joins the region when its intensity deviates from the reference
/// (the seed for fixed-range fills, the admitting neighbor otherwise) by at
/// most `tolerance`. An out-of-bounds seed yields an all-zero mask.
pub fn flood_fill(
    image: ArrayView2<u8>,
    seed: (usize, usize),
    tolerance: u8,
    options: FloodFillOptions,
) -> Array2<u8> {
    let (height, width) = image.dim();
    let mut mask = Array2::<u8>::zeros((height, width));

    let (sx, sy) = seed;
    if sx >= width || sy >= height {
        return mask;
    }

    let tol = tolerance as i32;
    let seed_value = image[[sy, sx]] as i32;

    let mut queue = VecDeque::new();
    mask[[sy, sx]] = 1;
    queue.push_back((sx, sy));

    while let Some((x, y)) = queue.pop_front() {
        let reference = if options.fixed_range {
            seed_value
        } else {
            image[[y, x]] as i32
        };

        for &(dx, dy) in options.connectivity.offsets() {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if mask[[ny, nx]] != 0 {
                continue;
            }
            if (image[[ny, nx]] as i32 - reference).abs() <= tol {
                mask[[ny, nx]] = 1;
                queue.push_back((nx, ny));
            }
        }
    }

    mask
}

/// Derive flood-fill seeds from the painted positive mask.
///
/// Every boundary pixel of every outer contour seeds the fill, plus each
/// contour's centroid when the centroid pixel is itself positive. The
/// centroid guard keeps a ring-shaped stroke from seeding into its own
/// hole.
pub fn derive_seeds(positive_mask: ArrayView2<u8>) -> Vec<(usize, usize)> {
    let mut seeds = Vec::new();

    for contour in extract_contours(positive_mask, ExtractionMode::OuterOnly) {
        for &(x, y) in &contour.points {
            seeds.push((x as usize, y as usize));
        }

        let (cx, cy) = contour.centroid();
        if cx >= 0
            && cy >= 0
            && (cy as usize) < positive_mask.dim().0
            && (cx as usize) < positive_mask.dim().1
            && positive_mask[[cy as usize, cx as usize]] > 0
        {
            seeds.push((cx as usize, cy as usize));
        }
    }

    seeds
}

/// Merge enclosed pockets of up to `max_area` pixels into the mask.
///
/// Per-pixel tolerance fills leave small gaps; closing them smooths the
/// extracted contours without materially changing the segmented region.
pub fn remove_small_holes(mask: ArrayView2<u8>, max_area: usize) -> Array2<u8> {
    let inverse = mask.mapv(|v| u8::from(v == 0));
    let (labels, count) = crate::contour::connected_components(inverse.view(), true);

    let mut areas = vec![0usize; count as usize + 1];
    for &id in labels.iter() {
        areas[id as usize] += 1;
    }

    let mut result = mask.to_owned();
    for (cell, &id) in result.iter_mut().zip(labels.iter()) {
        if id != 0 && areas[id as usize] <= max_area {
            *cell = 1;
        }
    }
    result
}

/// Build the fill substrate: intensities halved to 0..=127, with painted
/// negative pixels forced to 255 so they stop any legal-tolerance fill.
fn barrier_image(image: ArrayView2<u8>, negative_mask: ArrayView2<u8>) -> Array2<u8> {
    let mut scratch = image.mapv(|v| v / 2);
    for (cell, &neg) in scratch.iter_mut().zip(negative_mask.iter()) {
        if neg > 0 {
            *cell = 255;
        }
    }
    scratch
}

/// Grow a region from the given seeds, honoring the negative barrier.
///
/// Per-seed fills are unioned and small enclosed pockets removed. An empty
/// seed set yields an all-zero mask. The computation is a pure function of
/// its inputs, so repeated invocations with identical arguments produce
/// bit-identical masks.
pub fn grow_region(
    image: ArrayView2<u8>,
    negative_mask: ArrayView2<u8>,
    seeds: &[(usize, usize)],
    tolerance: u8,
    options: FloodFillOptions,
) -> Array2<u8> {
    let (height, width) = image.dim();
    let mut grown = Array2::<u8>::zeros((height, width));
    if seeds.is_empty() {
        return grown;
    }

    let tolerance = tolerance.min(TOLERANCE_MAX);
    let scratch = barrier_image(image, negative_mask);

    for &seed in seeds {
        let fill = flood_fill(scratch.view(), seed, tolerance, options);
        for (acc, &v) in grown.iter_mut().zip(fill.iter()) {
            *acc |= v;
        }
    }

    remove_small_holes(grown.view(), SMALL_HOLE_AREA)
}

/// Grow from the painted positive mask: derive seeds from its contours,
/// then fill. The result augments the painted region, never replaces it.
pub fn grow_from_painted(
    image: ArrayView2<u8>,
    positive_mask: ArrayView2<u8>,
    negative_mask: ArrayView2<u8>,
    tolerance: u8,
    options: FloodFillOptions,
) -> Array2<u8> {
    let seeds = derive_seeds(positive_mask);
    grow_region(image, negative_mask, &seeds, tolerance, options)
}
