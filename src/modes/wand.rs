//! Magic-wand selection.
//!
//! A primary click grows a region from the clicked pixel over the denoised
//! slice. With the append modifier held the new seed joins the existing
//! seed list and the fills are united; otherwise the click replaces the
//! selection. The wheel re-runs the fill at the adjusted tolerance and a
//! secondary click clears the selection.

use ndarray::{Array2, Array3};

use crate::contour::ExtractionMode;
use crate::controller::{
    AnnotationMode, Button, Modifiers, SessionContext, WheelDirection, KEY_TOGGLE_PREVIEW,
};
use crate::draw;
use crate::overlay::{composite_overlay, COLOR_CURSOR};
use crate::region_grow::{grow_region, FloodFillOptions};

pub struct WandMode {
    seeds: Vec<(usize, usize)>,
    grown: Array2<u8>,
    show_grown: bool,
}

impl WandMode {
    pub fn new(ctx: &SessionContext) -> Self {
        let (height, width) = ctx.shape();
        Self {
            seeds: Vec::new(),
            grown: Array2::zeros((height, width)),
            show_grown: true,
        }
    }

    /// Current selection as a binary mask.
    pub fn selection(&self) -> &Array2<u8> {
        &self.grown
    }

    pub fn seeds(&self) -> &[(usize, usize)] {
        &self.seeds
    }

    fn refresh(&mut self, ctx: &SessionContext) {
        let (height, width) = ctx.shape();
        // No painted barrier in wand mode.
        let negative = Array2::<u8>::zeros((height, width));
        self.grown = grow_region(
            ctx.denoised.view(),
            negative.view(),
            &self.seeds,
            ctx.config.tolerance,
            FloodFillOptions::default(),
        );
        log::debug!(
            "wand: {} seeds, {} px at tolerance {}",
            self.seeds.len(),
            self.grown.iter().filter(|&&v| v != 0).count(),
            ctx.config.tolerance
        );
    }
}

impl AnnotationMode for WandMode {
    fn on_pointer_down(
        &mut self,
        ctx: &SessionContext,
        button: Button,
        pos: (f64, f64),
        modifiers: Modifiers,
    ) {
        match button {
            Button::Primary => {
                let (x, y) = (pos.0.round(), pos.1.round());
                if x < 0.0 || y < 0.0 {
                    return;
                }
                // Append only on the plain append modifier; any subtract/
                // intersect bit falls back to replacing the selection.
                if !modifiers.append || modifiers.subtract {
                    self.seeds.clear();
                }
                self.seeds.push((x as usize, y as usize));
                self.refresh(ctx);
            }
            Button::Secondary => {
                self.seeds.clear();
                self.grown.fill(0);
            }
        }
    }

    fn on_pointer_up(&mut self, _ctx: &SessionContext, _button: Button) {}

    fn on_pointer_move(&mut self, _ctx: &SessionContext, _pos: (f64, f64)) {}

    fn on_wheel(&mut self, ctx: &SessionContext, _direction: WheelDirection) {
        self.refresh(ctx);
    }

    fn on_key(&mut self, _ctx: &SessionContext, code: u8) {
        if code == KEY_TOGGLE_PREVIEW {
            self.show_grown = !self.show_grown;
        }
    }

    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
        let base = draw::gray_to_rgb(ctx.image.view());
        if !self.show_grown {
            return base;
        }
        let mode = if ctx.config.fill_contours {
            ExtractionMode::OuterOnly
        } else {
            ExtractionMode::AllBoundaries
        };
        // Wand selections render white, distinct from committed labels.
        let (frame, _) = composite_overlay(base.view(), self.grown.view(), COLOR_CURSOR, mode);
        frame
    }
}
