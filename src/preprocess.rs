//! Session-start preprocessing of the source slice.
//!
//! Region growing fills over a smoothed copy of the intensity image so that
//! per-pixel noise does not fragment the grown region. The smoothing runs
//! once when a flood-fill-capable mode starts and is reused for every
//! subsequent fill.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// Smooth a grayscale slice with a simplified non-local-means filter:
/// each pixel becomes a weighted average of its 5x5 neighborhood, weighted
/// by both spatial and intensity similarity. `strength` (0.0-1.0) widens
/// the intensity acceptance.
///
/// Rows are processed in parallel.
pub fn denoise(input: ArrayView2<u8>, strength: f32) -> Array2<u8> {
    let (height, width) = input.dim();
    if height == 0 || width == 0 {
        return input.to_owned();
    }

    let radius = 2isize; // 5x5 window
    let sigma_space = 2.0f32;
    let sigma_color = (strength * 50.0 + 10.0).max(1.0);

    let rows: Vec<Vec<u8>> = (0..height as isize)
        .into_par_iter()
        .map(|y| {
            let mut row = vec![0u8; width];
            for x in 0..width as isize {
                let center = input[[y as usize, x as usize]] as f32;
                let mut sum = 0.0f32;
                let mut weight_sum = 0.0f32;

                for dy in -radius..=radius {
                    let sy = (y + dy).clamp(0, height as isize - 1) as usize;
                    for dx in -radius..=radius {
                        let sx = (x + dx).clamp(0, width as isize - 1) as usize;
                        let neighbor = input[[sy, sx]] as f32;

                        let spatial_dist =
                            ((dy * dy + dx * dx) as f32).sqrt();
                        let spatial_weight =
                            (-spatial_dist / (2.0 * sigma_space * sigma_space)).exp();
                        let color_dist = (center - neighbor).abs();
                        let color_weight =
                            (-color_dist / (2.0 * sigma_color * sigma_color)).exp();

                        let weight = spatial_weight * color_weight;
                        sum += neighbor * weight;
                        weight_sum += weight;
                    }
                }

                row[x as usize] = if weight_sum > 0.0 {
                    (sum / weight_sum).clamp(0.0, 255.0) as u8
                } else {
                    center as u8
                };
            }
            row
        })
        .collect();

    let flat: Vec<u8> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((height, width), flat).expect("row-major reassembly")
}
