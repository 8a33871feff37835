//! Concrete annotation tools.
//!
//! Each mode implements [`crate::controller::AnnotationMode`] and owns its
//! tool state: the raster modes ([`BrushMode`], [`WandMode`]) hold label
//! masks and a grown-region preview, the vector modes ([`DistanceMode`],
//! [`PolygonMode`], [`KeypointMode`]) share one pointer-interaction core
//! over a [`crate::vector::VectorStore`].

mod brush;
mod vector_tools;
mod wand;

pub use brush::BrushMode;
pub use vector_tools::{DistanceMode, KeypointMode, PolygonMode};
pub use wand::WandMode;
