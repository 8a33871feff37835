//! Event routing and session orchestration.
//!
//! The [`AnnotationController`] owns one annotation session: the source
//! slice, the live tool parameters, and the active annotation mode. The
//! external input adapter feeds it discrete [`InputEvent`]s; after every
//! processed event the controller asks the mode for a fresh overlay and
//! hands it to the [`DisplayAdapter`]. Exactly one render per event, no
//! internal buffering.
//!
//! All calls are expected to arrive serialized from a single input source;
//! the engine performs no internal locking (see the crate docs).

use ndarray::{Array2, Array3, ArrayView3};

use crate::geometry::PixelSpacing;
use crate::preprocess;
use crate::region_grow::TOLERANCE_MAX;

/// Pointer button, as reported by the input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

/// Wheel rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Modifier bits delivered with pointer-down events. Only the magic wand
/// consumes them, for seed-list accumulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Append to the current selection instead of replacing it.
    pub append: bool,
    /// Subtract/intersect bit; the reference behavior folds this into
    /// "replace".
    pub subtract: bool,
}

/// Discrete input event from the external adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        button: Button,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        button: Button,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    Wheel {
        direction: WheelDirection,
    },
    Key {
        code: u8,
    },
}

/// Toggles the grown-region preview overlay.
pub const KEY_TOGGLE_PREVIEW: u8 = b'f';
/// Ends the session.
pub const KEY_QUIT: u8 = b'q';
/// Ends the session (escape).
pub const KEY_ESCAPE: u8 = 0x1b;

/// What the secondary-button brush does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// Erase to empty.
    Clear,
    /// Convert to the negative "anti-brush" label.
    AntiPaint,
}

/// Live-adjustable tool parameters, typically bound to adapter-provided
/// sliders.
#[derive(Debug, Clone, Copy)]
pub struct ToolConfig {
    /// Maximum intensity deviation for region growing (0..=127).
    pub tolerance: u8,
    /// Brush radius in pixels (0..=20).
    pub brush_radius: i32,
    /// Fill contour interiors visually instead of honoring holes.
    pub fill_contours: bool,
    /// Secondary-button brush behavior.
    pub erase_mode: EraseMode,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tolerance: 10,
            brush_radius: 5,
            fill_contours: false,
            erase_mode: EraseMode::Clear,
        }
    }
}

pub const BRUSH_RADIUS_MAX: i32 = 20;

/// Per-session read context handed to the active mode: the windowed source
/// slice, its denoised copy (built once at session start), the physical
/// pixel spacing, and the live tool parameters.
pub struct SessionContext {
    pub image: Array2<u8>,
    pub denoised: Array2<u8>,
    pub spacing: PixelSpacing,
    pub config: ToolConfig,
}

/// Smoothing strength for the session-start denoise pass.
const DENOISE_STRENGTH: f32 = 0.35;

impl SessionContext {
    pub fn new(image: Array2<u8>, spacing: PixelSpacing) -> Self {
        let denoised = preprocess::denoise(image.view(), DENOISE_STRENGTH);
        Self {
            image,
            denoised,
            spacing,
            config: ToolConfig::default(),
        }
    }

    /// Raster shape as `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.image.dim()
    }
}

/// Pointer-interaction state threaded through the vector-editing modes.
/// Reset on every pointer-up; the hover is recomputed on every pointer
/// move while no drag is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionState {
    pub pointer: (f64, f64),
    pub pointer_down: bool,
    pub drag_target: Option<crate::vector::Hit>,
}

/// Receives the composed frame after every processed event.
pub trait DisplayAdapter {
    fn render_frame(&mut self, frame: ArrayView3<u8>);
}

/// Whether the session continues after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Continue,
    Quit,
}

/// Capability interface one annotation tool implements. The controller
/// forwards events to the active mode and composes nothing itself.
pub trait AnnotationMode {
    fn on_pointer_down(
        &mut self,
        ctx: &SessionContext,
        button: Button,
        pos: (f64, f64),
        modifiers: Modifiers,
    );
    fn on_pointer_up(&mut self, ctx: &SessionContext, button: Button);
    fn on_pointer_move(&mut self, ctx: &SessionContext, pos: (f64, f64));
    fn on_wheel(&mut self, ctx: &SessionContext, direction: WheelDirection);
    fn on_key(&mut self, ctx: &SessionContext, code: u8);
    /// Compose the current annotation state over the base slice.
    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8>;
}

/// Top-level orchestrator for one annotation session.
pub struct AnnotationController<M: AnnotationMode> {
    context: SessionContext,
    mode: M,
}

impl<M: AnnotationMode> AnnotationController<M> {
    pub fn new(context: SessionContext, mode: M) -> Self {
        Self { context, mode }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// The active mode, for mode-specific readouts (e.g. segment lengths).
    pub fn mode(&self) -> &M {
        &self.mode
    }

    // Trackbar surface: setters mirror the adapter's slider callbacks.

    pub fn set_tolerance(&mut self, tolerance: u8) {
        self.context.config.tolerance = tolerance.min(TOLERANCE_MAX);
    }

    pub fn set_brush_radius(&mut self, radius: i32) {
        self.context.config.brush_radius = radius.clamp(0, BRUSH_RADIUS_MAX);
    }

    pub fn set_fill_contours(&mut self, fill: bool) {
        self.context.config.fill_contours = fill;
    }

    pub fn set_erase_mode(&mut self, mode: EraseMode) {
        self.context.config.erase_mode = mode;
    }

    /// Process one event: route it to the active mode, then render.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        display: &mut dyn DisplayAdapter,
    ) -> SessionStatus {
        match event {
            InputEvent::PointerDown {
                button,
                x,
                y,
                modifiers,
            } => self
                .mode
                .on_pointer_down(&self.context, button, (x, y), modifiers),
            InputEvent::PointerUp { button } => self.mode.on_pointer_up(&self.context, button),
            InputEvent::PointerMove { x, y } => self.mode.on_pointer_move(&self.context, (x, y)),
            InputEvent::Wheel { direction } => {
                let tolerance = self.context.config.tolerance;
                self.context.config.tolerance = match direction {
                    WheelDirection::Up => tolerance.saturating_add(1).min(TOLERANCE_MAX),
                    WheelDirection::Down => tolerance.saturating_sub(1),
                };
                self.mode.on_wheel(&self.context, direction);
            }
            InputEvent::Key { code } => {
                if code == KEY_QUIT || code == KEY_ESCAPE {
                    return SessionStatus::Quit;
                }
                self.mode.on_key(&self.context, code);
            }
        }

        let frame = self.mode.render_overlay(&self.context);
        display.render_frame(frame.view());
        SessionStatus::Continue
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::RecordingDisplay;

    /// Mode that records which handlers fired.
    #[derive(Default)]
    struct ProbeMode {
        downs: usize,
        ups: usize,
        moves: usize,
        wheels: usize,
        keys: Vec<u8>,
    }

    impl AnnotationMode for ProbeMode {
        fn on_pointer_down(
            &mut self,
            _ctx: &SessionContext,
            _button: Button,
            _pos: (f64, f64),
            _modifiers: Modifiers,
        ) {
            self.downs += 1;
        }
        fn on_pointer_up(&mut self, _ctx: &SessionContext, _button: Button) {
            self.ups += 1;
        }
        fn on_pointer_move(&mut self, _ctx: &SessionContext, _pos: (f64, f64)) {
            self.moves += 1;
        }
        fn on_wheel(&mut self, _ctx: &SessionContext, _direction: WheelDirection) {
            self.wheels += 1;
        }
        fn on_key(&mut self, _ctx: &SessionContext, code: u8) {
            self.keys.push(code);
        }
        fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
            let (h, w) = ctx.shape();
            Array3::zeros((h, w, 3))
        }
    }

    fn controller() -> AnnotationController<ProbeMode> {
        let image = Array2::<u8>::zeros((8, 8));
        let context = SessionContext::new(image, PixelSpacing::default());
        AnnotationController::new(context, ProbeMode::default())
    }

    #[test]
    fn test_one_render_per_event() {
        let mut ctl = controller();
        let mut display = RecordingDisplay::default();

        let events = [
            InputEvent::PointerDown {
                button: Button::Primary,
                x: 1.0,
                y: 1.0,
                modifiers: Modifiers::default(),
            },
            InputEvent::PointerMove { x: 2.0, y: 2.0 },
            InputEvent::PointerUp {
                button: Button::Primary,
            },
        ];
        for event in events {
            assert_eq!(ctl.handle_event(event, &mut display), SessionStatus::Continue);
        }

        assert_eq!(display.frames, 3);
        assert_eq!(ctl.mode().downs, 1);
        assert_eq!(ctl.mode().moves, 1);
        assert_eq!(ctl.mode().ups, 1);
    }

    #[test]
    fn test_wheel_adjusts_tolerance_before_forwarding() {
        let mut ctl = controller();
        let mut display = RecordingDisplay::default();

        ctl.set_tolerance(0);
        ctl.handle_event(
            InputEvent::Wheel {
                direction: WheelDirection::Down,
            },
            &mut display,
        );
        assert_eq!(ctl.context().config.tolerance, 0); // saturates

        ctl.handle_event(
            InputEvent::Wheel {
                direction: WheelDirection::Up,
            },
            &mut display,
        );
        assert_eq!(ctl.context().config.tolerance, 1);
        assert_eq!(ctl.mode().wheels, 2);

        ctl.set_tolerance(255);
        assert_eq!(ctl.context().config.tolerance, TOLERANCE_MAX);
    }

    #[test]
    fn test_quit_keys_end_session_without_render() {
        for code in [KEY_QUIT, KEY_ESCAPE] {
            let mut ctl = controller();
            let mut display = RecordingDisplay::default();
            let status = ctl.handle_event(InputEvent::Key { code }, &mut display);
            assert_eq!(status, SessionStatus::Quit);
            assert_eq!(display.frames, 0);
        }
    }

    #[test]
    fn test_other_keys_reach_the_mode() {
        let mut ctl = controller();
        let mut display = RecordingDisplay::default();
        ctl.handle_event(
            InputEvent::Key {
                code: KEY_TOGGLE_PREVIEW,
            },
            &mut display,
        );
        assert_eq!(ctl.mode().keys, vec![KEY_TOGGLE_PREVIEW]);
        assert_eq!(display.frames, 1);
    }

    #[test]
    fn test_slider_clamps() {
        let mut ctl = controller();
        ctl.set_brush_radius(99);
        assert_eq!(ctl.context().config.brush_radius, BRUSH_RADIUS_MAX);
        ctl.set_brush_radius(-5);
        assert_eq!(ctl.context().config.brush_radius, 0);
    }
}
