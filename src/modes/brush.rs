//! Brush segmentation with region-growing assistance.
//!
//! The primary button paints the positive label, the secondary button
//! erases (or paints the negative "anti-brush" label, depending on the
//! configured erase mode). Painted strokes seed a region-growing pass over
//! the denoised slice; the grown region renders as a preview that can be
//! toggled on and off.

use ndarray::{Array2, Array3};

use crate::contour::ExtractionMode;
use crate::controller::{
    AnnotationMode, Button, EraseMode, Modifiers, SessionContext, WheelDirection,
    KEY_TOGGLE_PREVIEW,
};
use crate::draw;
use crate::mask::{MaskLabel, MaskStore};
use crate::overlay::{composite_overlay, COLOR_CURSOR, COLOR_NEGATIVE, COLOR_POSITIVE};
use crate::region_grow::{grow_from_painted, FloodFillOptions};

pub struct BrushMode {
    mask: MaskStore,
    grown: Array2<u8>,
    show_grown: bool,
    painting: bool,
    erasing: bool,
}

impl BrushMode {
    pub fn new(ctx: &SessionContext) -> Self {
        let (height, width) = ctx.shape();
        Self {
            mask: MaskStore::new(height, width),
            grown: Array2::zeros((height, width)),
            show_grown: false,
            painting: false,
            erasing: false,
        }
    }

    /// Painted labels, without the grown region.
    pub fn mask(&self) -> &MaskStore {
        &self.mask
    }

    /// Current region-growing result.
    pub fn grown_region(&self) -> &Array2<u8> {
        &self.grown
    }

    /// Painted positive label united with the grown region; the mask a
    /// caller would persist.
    pub fn committed_mask(&self) -> Array2<u8> {
        let mut out = self.mask.positive_mask();
        out.zip_mut_with(&self.grown, |dst, &src| *dst |= src);
        out
    }

    fn refresh_growth(&mut self, ctx: &SessionContext) {
        self.grown = grow_from_painted(
            ctx.denoised.view(),
            self.mask.positive_mask().view(),
            self.mask.negative_mask().view(),
            ctx.config.tolerance,
            FloodFillOptions::default(),
        );
        log::debug!(
            "region growing: {} px at tolerance {}",
            self.grown.iter().filter(|&&v| v != 0).count(),
            ctx.config.tolerance
        );
    }

    fn apply_stroke(&mut self, ctx: &SessionContext, pos: (f64, f64)) {
        let center = (pos.0.round() as i32, pos.1.round() as i32);
        let radius = ctx.config.brush_radius;

        if self.painting {
            self.mask.paint(center, radius, MaskLabel::Positive);
        } else if self.erasing {
            let label = match ctx.config.erase_mode {
                EraseMode::Clear => MaskLabel::Empty,
                EraseMode::AntiPaint => MaskLabel::Negative,
            };
            self.mask.paint(center, radius, label);
        }

        if (self.painting || self.erasing) && self.show_grown {
            self.refresh_growth(ctx);
        }
        self.mask.set_cursor_preview(center, radius);
    }
}

impl AnnotationMode for BrushMode {
    fn on_pointer_down(
        &mut self,
        ctx: &SessionContext,
        button: Button,
        pos: (f64, f64),
        _modifiers: Modifiers,
    ) {
        match button {
            Button::Primary => {
                self.painting = true;
                self.erasing = false;
            }
            Button::Secondary => {
                self.erasing = true;
                self.painting = false;
            }
        }
        self.apply_stroke(ctx, pos);
    }

    fn on_pointer_up(&mut self, ctx: &SessionContext, button: Button) {
        match button {
            Button::Primary => self.painting = false,
            Button::Secondary => self.erasing = false,
        }
        if self.show_grown {
            self.refresh_growth(ctx);
        }
    }

    fn on_pointer_move(&mut self, ctx: &SessionContext, pos: (f64, f64)) {
        self.apply_stroke(ctx, pos);
    }

    fn on_wheel(&mut self, ctx: &SessionContext, _direction: WheelDirection) {
        if self.show_grown {
            self.refresh_growth(ctx);
        }
    }

    fn on_key(&mut self, ctx: &SessionContext, code: u8) {
        if code == KEY_TOGGLE_PREVIEW {
            self.show_grown = !self.show_grown;
            if self.show_grown {
                self.refresh_growth(ctx);
            }
        }
    }

    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
        let base = draw::gray_to_rgb(ctx.image.view());
        let mode = if ctx.config.fill_contours {
            ExtractionMode::OuterOnly
        } else {
            ExtractionMode::AllBoundaries
        };

        let positive = if self.show_grown {
            self.committed_mask()
        } else {
            self.mask.positive_mask()
        };

        let (frame, _) = composite_overlay(base.view(), positive.view(), COLOR_POSITIVE, mode);
        let (frame, _) = composite_overlay(
            frame.view(),
            self.mask.negative_mask().view(),
            COLOR_NEGATIVE,
            mode,
        );
        // The cursor preview is a thin ring; never fill it.
        let (frame, _) = composite_overlay(
            frame.view(),
            self.mask.cursor_preview().view(),
            COLOR_CURSOR,
            ExtractionMode::AllBoundaries,
        );
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelSpacing;

    fn context(height: usize, width: usize) -> SessionContext {
        SessionContext::new(Array2::<u8>::zeros((height, width)), PixelSpacing::default())
    }

    fn press(mode: &mut BrushMode, ctx: &SessionContext, button: Button, x: f64, y: f64) {
        mode.on_pointer_down(ctx, button, (x, y), Modifiers::default());
        mode.on_pointer_up(ctx, button);
    }

    #[test]
    fn test_primary_paints_positive() {
        let ctx = context(20, 20);
        let mut mode = BrushMode::new(&ctx);
        press(&mut mode, &ctx, Button::Primary, 10.0, 10.0);

        let positive = mode.mask().positive_mask();
        assert_eq!(positive[[10, 10]], 1);
        assert!(positive.iter().filter(|&&v| v != 0).count() > 1);
    }

    #[test]
    fn test_secondary_erases_or_antipaints() {
        let mut ctx = context(20, 20);
        let mut mode = BrushMode::new(&ctx);
        press(&mut mode, &ctx, Button::Primary, 10.0, 10.0);

        ctx.config.erase_mode = EraseMode::Clear;
        press(&mut mode, &ctx, Button::Secondary, 10.0, 10.0);
        assert_eq!(mode.mask().positive_mask().sum(), 0);
        assert_eq!(mode.mask().negative_mask().sum(), 0);

        ctx.config.erase_mode = EraseMode::AntiPaint;
        press(&mut mode, &ctx, Button::Secondary, 10.0, 10.0);
        assert_eq!(mode.mask().negative_mask()[[10, 10]], 1);
    }

    #[test]
    fn test_drag_paints_at_every_event() {
        let ctx = context(20, 20);
        let mut mode = BrushMode::new(&ctx);
        mode.on_pointer_down(&ctx, Button::Primary, (2.0, 2.0), Modifiers::default());
        mode.on_pointer_move(&ctx, (2.0, 10.0));
        mode.on_pointer_up(&ctx, Button::Primary);

        let positive = mode.mask().positive_mask();
        assert_eq!(positive[[2, 2]], 1);
        assert_eq!(positive[[10, 2]], 1);
    }

    #[test]
    fn test_move_without_press_only_updates_cursor() {
        let ctx = context(20, 20);
        let mut mode = BrushMode::new(&ctx);
        mode.on_pointer_move(&ctx, (10.0, 10.0));

        assert_eq!(mode.mask().positive_mask().sum(), 0);
        assert!(mode.mask().cursor_preview().sum() > 0);
    }

    #[test]
    fn test_preview_toggle_grows_from_paint() {
        // Uniform slice at tolerance 0: a single painted pixel floods the
        // whole image.
        let mut ctx = context(12, 12);
        ctx.config.tolerance = 0;
        ctx.config.brush_radius = 0;

        let mut mode = BrushMode::new(&ctx);
        press(&mut mode, &ctx, Button::Primary, 6.0, 6.0);
        assert_eq!(mode.grown_region().sum(), 0);

        mode.on_key(&ctx, KEY_TOGGLE_PREVIEW);
        assert_eq!(
            mode.grown_region().iter().filter(|&&v| v != 0).count(),
            12 * 12
        );
        assert_eq!(mode.committed_mask()[[0, 0]], 1);

        mode.on_key(&ctx, KEY_TOGGLE_PREVIEW);
        let frame = mode.render_overlay(&ctx);
        assert_eq!(frame.dim(), (12, 12, 3));
    }

    #[test]
    fn test_wheel_recomputes_while_preview_shown() {
        let mut ctx = context(10, 10);
        ctx.config.tolerance = 0;
        ctx.config.brush_radius = 0;

        let mut mode = BrushMode::new(&ctx);
        press(&mut mode, &ctx, Button::Primary, 5.0, 5.0);
        mode.on_key(&ctx, KEY_TOGGLE_PREVIEW);
        let before = mode.grown_region().sum();
        mode.on_wheel(&ctx, WheelDirection::Up);
        assert_eq!(mode.grown_region().sum(), before);
    }
}
