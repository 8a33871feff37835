//! Slicemark
//!
//! Interactive annotation engine for grayscale medical image slices:
//! label-mask painting with region-growing assistance, contour extraction
//! and overlay rendering, and vector annotations (distance measurements,
//! polygon outlines, keypoints) with hover/drag editing. Rendering targets
//! and input capture stay outside the crate; an adapter feeds
//! [`controller::InputEvent`]s in and receives composed frames through the
//! [`controller::DisplayAdapter`] trait.
//!
//! ## Image Format
//! - **Intensity slices**: `Array2<u8>` indexed `[row, col]`, windowed to
//!   8 bit by the image source
//! - **Binary masks**: `Array2<u8>` with values 0/1
//! - **Composed frames**: `Array3<u8>` of shape (height, width, 3), RGB
//!
//! Pointer coordinates are `(x, y)` = `(col, row)`; vector annotations keep
//! sub-pixel `f64` positions.
//!
//! All state lives in plain owned values and every call mutates
//! synchronously; callers serialize access from their event loop.

pub mod contour;
pub mod controller;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod modes;
pub mod overlay;
pub mod preprocess;
pub mod region_grow;
pub mod vector;

pub use contour::{Contour, ContourKind, ExtractionMode};
pub use controller::{
    AnnotationController, AnnotationMode, Button, DisplayAdapter, EraseMode, InputEvent,
    Modifiers, SessionContext, SessionStatus, ToolConfig, WheelDirection,
};
pub use error::{AnnotationError, AnnotationResult};
pub use geometry::PixelSpacing;
pub use mask::{MaskLabel, MaskStore};
pub use modes::{BrushMode, DistanceMode, KeypointMode, PolygonMode, WandMode};
pub use vector::{Hit, Primitive, PrimitiveKind, VectorStore};
