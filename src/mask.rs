//! Per-pixel label raster and brush mutation.
//!
//! The [`MaskStore`] owns the authoritative annotation raster: one label per
//! pixel over the fixed shape of the source slice. The brush writes filled
//! discs of a single label; the two erase sub-modes are just discs of
//! [`MaskLabel::Empty`] (eraser) or [`MaskLabel::Negative`] (anti-brush).
//!
//! A second transient raster holds the cursor ring overlay. It is rewritten
//! on every pointer move and never persisted.

use ndarray::Array2;

/// Label assigned to each pixel of the annotation raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MaskLabel {
    /// Not annotated.
    Empty = 0,
    /// Painted as part of the region of interest.
    Positive = 1,
    /// Painted as a hard "not this" barrier for region growing.
    Negative = 2,
}

/// Owns the per-pixel label raster and the transient cursor overlay.
///
/// The shape is fixed at construction (it matches the source image) and
/// never changes for the lifetime of an annotation session.
pub struct MaskStore {
    labels: Array2<u8>,
    cursor: Array2<u8>,
}

impl MaskStore {
    /// Create an empty store matching the source image shape.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            labels: Array2::zeros((height, width)),
            cursor: Array2::zeros((height, width)),
        }
    }

    /// Raster shape as `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.labels.dim()
    }

    /// Set every cell within Euclidean distance `radius` of `center` to
    /// `label`. `center` is `(x, y)`. Cells outside the raster are skipped,
    /// so the operation is total over the coordinate space.
    pub fn paint(&mut self, center: (i32, i32), radius: i32, label: MaskLabel) {
        let (height, width) = self.labels.dim();
        let (cx, cy) = center;
        let r_sq = radius * radius;

        for dy in -radius..=radius {
            let y = cy + dy;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for dx in -radius..=radius {
                let x = cx + dx;
                if x < 0 || x >= width as i32 {
                    continue;
                }
                if dx * dx + dy * dy <= r_sq {
                    self.labels[[y as usize, x as usize]] = label as u8;
                }
            }
        }
    }

    /// Binary view of the cells painted [`MaskLabel::Positive`].
    pub fn positive_mask(&self) -> Array2<u8> {
        self.labels.mapv(|v| u8::from(v == MaskLabel::Positive as u8))
    }

    /// Binary view of the cells painted [`MaskLabel::Negative`].
    pub fn negative_mask(&self) -> Array2<u8> {
        self.labels.mapv(|v| u8::from(v == MaskLabel::Negative as u8))
    }

    /// Rewrite the transient preview raster to a 2-px ring of the given
    /// radius at `center`, tracking the brush cursor.
    pub fn set_cursor_preview(&mut self, center: (i32, i32), radius: i32) {
        self.cursor.fill(0);
        let (height, width) = self.cursor.dim();
        let (cx, cy) = center;
        let outer_sq = radius * radius;
        // Ring thickness 2, clamped so tiny brushes still show a dot.
        let inner = (radius - 2).max(0);
        let inner_sq = inner * inner;

        for dy in -radius..=radius {
            let y = cy + dy;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for dx in -radius..=radius {
                let x = cx + dx;
                if x < 0 || x >= width as i32 {
                    continue;
                }
                let d_sq = dx * dx + dy * dy;
                if d_sq <= outer_sq && d_sq >= inner_sq {
                    self.cursor[[y as usize, x as usize]] = 1;
                }
            }
        }
    }

    /// Clear the cursor overlay (pointer left the canvas).
    pub fn clear_cursor_preview(&mut self) {
        self.cursor.fill(0);
    }

    /// Binary raster of the current cursor ring.
    pub fn cursor_preview(&self) -> &Array2<u8> {
        &self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc_reference(height: usize, width: usize, center: (i32, i32), radius: i32) -> Array2<u8> {
        let mut expected = Array2::<u8>::zeros((height, width));
        for y in 0..height {
            for x in 0..width {
                let dx = x as i32 - center.0;
                let dy = y as i32 - center.1;
                if dx * dx + dy * dy <= radius * radius {
                    expected[[y, x]] = 1;
                }
            }
        }
        expected
    }

    #[test]
    fn test_paint_matches_disc() {
        let mut store = MaskStore::new(20, 20);
        store.paint((10, 10), 4, MaskLabel::Positive);

        assert_eq!(store.positive_mask(), disc_reference(20, 20, (10, 10), 4));
    }

    #[test]
    fn test_paint_clipped_at_bounds() {
        let mut store = MaskStore::new(10, 10);
        store.paint((0, 0), 3, MaskLabel::Positive);

        assert_eq!(store.positive_mask(), disc_reference(10, 10, (0, 0), 3));
    }

    #[test]
    fn test_paint_fully_outside_is_noop() {
        let mut store = MaskStore::new(10, 10);
        store.paint((-50, -50), 3, MaskLabel::Positive);

        assert_eq!(store.positive_mask().sum(), 0);
    }

    #[test]
    fn test_erase_sub_modes() {
        let mut store = MaskStore::new(10, 10);
        store.paint((5, 5), 3, MaskLabel::Positive);

        // Eraser clears to empty.
        store.paint((5, 5), 1, MaskLabel::Empty);
        assert_eq!(store.positive_mask()[[5, 5]], 0);
        assert_eq!(store.negative_mask()[[5, 5]], 0);

        // Anti-brush converts to negative.
        store.paint((5, 5), 1, MaskLabel::Negative);
        assert_eq!(store.negative_mask()[[5, 5]], 1);
        // The positive ring around the erased center survives.
        assert_eq!(store.positive_mask()[[5, 2]], 1);
    }

    #[test]
    fn test_cursor_preview_is_ring() {
        let mut store = MaskStore::new(20, 20);
        store.set_cursor_preview((10, 10), 5);

        let cursor = store.cursor_preview();
        assert_eq!(cursor[[10, 10]], 0); // hollow center
        assert_eq!(cursor[[10, 15]], 1); // on the rim
        assert_eq!(cursor[[5, 10]], 1);

        // Rewritten, not accumulated.
        store.set_cursor_preview((2, 2), 1);
        assert_eq!(store.cursor_preview()[[10, 15]], 0);

        store.clear_cursor_preview();
        assert_eq!(store.cursor_preview().sum(), 0);
    }
}
