//! Vector annotation primitives: keypoints, measurement segments, polygons.
//!
//! A [`VectorStore`] owns the ordered primitive list for one annotation
//! session and implements the editing operations the interactive tools
//! drive: nearest-element hit testing, point placement, polygon closure,
//! drag-to-move, and single-step removal. One primitive kind is active per
//! session; the only exception is a removed segment endpoint degenerating
//! into a free point, which keeps the surviving endpoint's information.
//!
//! Lifecycle of a primitive under edit: `Empty -> PartiallyPlaced ->
//! Complete`; complete elements are then hovered (within the correction
//! radius) or not, and dragged between pointer-down-on-hover and pointer-up.

use crate::error::{AnnotationError, AnnotationResult};
use crate::geometry::{
    physical_distance, point_distance, point_segment_distance, projects_onto_segment, PixelSpacing,
};

/// Cursor radius in pixels; the correction radii derive from it.
pub const CURSOR_SIZE: i32 = 3;

/// Kind of primitive a store edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Keypoint,
    Segment,
    Polygon,
}

impl PrimitiveKind {
    /// Hover distance threshold: hits farther than this do not select.
    pub fn correction_radius(self) -> f64 {
        match self {
            PrimitiveKind::Keypoint => (CURSOR_SIZE * 2) as f64,
            PrimitiveKind::Segment | PrimitiveKind::Polygon => (CURSOR_SIZE * 3) as f64,
        }
    }
}

/// One vector annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A free point.
    Point((f64, f64)),
    /// A 2-point measurement segment; `b` is `None` while only the first
    /// endpoint has been placed.
    Segment {
        a: (f64, f64),
        b: Option<(f64, f64)>,
    },
    /// An ordered vertex loop. When `closed`, the last vertex is a
    /// duplicate of the first.
    Polygon {
        vertices: Vec<(f64, f64)>,
        closed: bool,
    },
}

impl Primitive {
    fn is_incomplete(&self) -> bool {
        match self {
            Primitive::Segment { b, .. } => b.is_none(),
            Primitive::Polygon { closed, .. } => !closed,
            Primitive::Point(_) => false,
        }
    }
}

/// Result of a nearest-element query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the primitive in the store.
    pub element: usize,
    /// Vertex/endpoint index within the primitive; `None` means the
    /// segment body (between the endpoints) was the nearest sub-element.
    pub vertex: Option<usize>,
    /// Distance from the query point in pixels.
    pub distance: f64,
}

impl Hit {
    /// Whether this hit is close enough to count as hovering.
    pub fn within(&self, radius: f64) -> bool {
        self.distance <= radius
    }
}

/// Ordered collection of primitives of one kind, with editing operations.
pub struct VectorStore {
    kind: PrimitiveKind,
    primitives: Vec<Primitive>,
}

impl VectorStore {
    pub fn new(kind: PrimitiveKind) -> Self {
        let mut primitives = Vec::new();
        if kind == PrimitiveKind::Polygon {
            // The polygon tool always has an in-progress polygon to extend.
            primitives.push(Primitive::Polygon {
                vertices: Vec::new(),
                closed: false,
            });
        }
        Self { kind, primitives }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Nearest primitive/sub-element to `p`, or `None` for an empty store.
    ///
    /// Keypoints and polygon vertices are measured point-to-point; complete
    /// segments additionally expose their body (perpendicular distance,
    /// only while the query projects strictly between the endpoints).
    /// Incomplete segments are skipped; the in-progress polygon's vertices
    /// stay hit-testable, which the closure gesture relies on.
    pub fn nearest_element(&self, p: (f64, f64)) -> Option<Hit> {
        let mut best: Option<Hit> = None;

        let mut consider = |candidate: Hit| {
            if best.map_or(true, |b| candidate.distance < b.distance) {
                best = Some(candidate);
            }
        };

        for (i, primitive) in self.primitives.iter().enumerate() {
            match primitive {
                Primitive::Point(pt) => consider(Hit {
                    element: i,
                    vertex: None,
                    distance: point_distance(p, *pt),
                }),
                Primitive::Segment { a, b: Some(b) } => {
                    consider(Hit {
                        element: i,
                        vertex: Some(0),
                        distance: point_distance(p, *a),
                    });
                    consider(Hit {
                        element: i,
                        vertex: Some(1),
                        distance: point_distance(p, *b),
                    });
                    if projects_onto_segment(p, *a, *b) {
                        consider(Hit {
                            element: i,
                            vertex: None,
                            distance: point_segment_distance(p, *a, *b),
                        });
                    }
                }
                Primitive::Segment { b: None, .. } => {}
                Primitive::Polygon { vertices, .. } => {
                    for (j, v) in vertices.iter().enumerate() {
                        consider(Hit {
                            element: i,
                            vertex: Some(j),
                            distance: point_distance(p, *v),
                        });
                    }
                }
            }
        }

        best
    }

    /// Place a point: append a keypoint, extend/complete a segment, or add
    /// a vertex to the in-progress polygon.
    pub fn place_point(&mut self, p: (f64, f64)) {
        match self.kind {
            PrimitiveKind::Keypoint => self.primitives.push(Primitive::Point(p)),
            PrimitiveKind::Segment => match self.primitives.last_mut() {
                Some(Primitive::Segment { b: b @ None, .. }) => *b = Some(p),
                _ => self.primitives.push(Primitive::Segment { a: p, b: None }),
            },
            PrimitiveKind::Polygon => {
                if let Some(Primitive::Polygon {
                    vertices,
                    closed: false,
                }) = self.primitives.last_mut()
                {
                    vertices.push(p);
                } else {
                    self.primitives.push(Primitive::Polygon {
                        vertices: vec![p],
                        closed: false,
                    });
                }
            }
        }
    }

    /// Whether `hit` targets the first vertex of the in-progress polygon
    /// (the closure gesture).
    pub fn hits_active_polygon_start(&self, hit: &Hit) -> bool {
        self.kind == PrimitiveKind::Polygon
            && hit.element + 1 == self.primitives.len()
            && hit.vertex == Some(0)
            && matches!(
                self.primitives.last(),
                Some(Primitive::Polygon { closed: false, vertices }) if !vertices.is_empty()
            )
    }

    /// Close the in-progress polygon: append a duplicate of its first
    /// vertex and start a fresh empty polygon. Requires at least 3
    /// vertices; otherwise the store is left unchanged.
    pub fn close_polygon(&mut self) -> AnnotationResult<()> {
        let Some(Primitive::Polygon { vertices, closed }) = self.primitives.last_mut() else {
            return Err(AnnotationError::InvalidGeometry("no polygon in progress"));
        };
        if *closed {
            return Err(AnnotationError::InvalidGeometry("polygon already closed"));
        }
        if vertices.len() < 3 {
            return Err(AnnotationError::InvalidGeometry(
                "polygon needs at least 3 vertices to close",
            ));
        }

        let first = vertices[0];
        vertices.push(first);
        *closed = true;
        self.primitives.push(Primitive::Polygon {
            vertices: Vec::new(),
            closed: false,
        });
        Ok(())
    }

    /// Translate the element selected by `hit`.
    ///
    /// A selected vertex moves alone, except the shared first/closing
    /// vertex of a closed polygon, which moves as a pair. A segment hit on
    /// its body (`vertex == None`) translates both endpoints together.
    pub fn move_element(&mut self, hit: &Hit, dx: f64, dy: f64) {
        let Some(primitive) = self.primitives.get_mut(hit.element) else {
            return;
        };
        let shift = |p: &mut (f64, f64)| {
            p.0 += dx;
            p.1 += dy;
        };

        match (primitive, hit.vertex) {
            (Primitive::Point(p), _) => shift(p),
            (Primitive::Segment { a, b }, Some(j)) => {
                if j == 0 {
                    shift(a);
                } else if let Some(b) = b {
                    shift(b);
                }
            }
            (Primitive::Segment { a, b }, None) => {
                shift(a);
                if let Some(b) = b {
                    shift(b);
                }
            }
            (Primitive::Polygon { vertices, closed }, Some(j)) => {
                let last = vertices.len().saturating_sub(1);
                if *closed && (j == 0 || j == last) {
                    if let Some(v) = vertices.first_mut() {
                        shift(v);
                    }
                    if last > 0 {
                        if let Some(v) = vertices.last_mut() {
                            shift(v);
                        }
                    }
                } else if let Some(v) = vertices.get_mut(j) {
                    shift(v);
                }
            }
            (Primitive::Polygon { .. }, None) => {}
        }
    }

    /// Remove per the single-step rules: an incomplete trailing segment
    /// pops outright; a hovered vertex removes that vertex (a 2-point
    /// segment degenerates to a free point, keeping the surviving
    /// endpoint); a hovered segment body removes the whole primitive.
    /// Without a qualifying hover this is a no-op.
    pub fn remove_element(&mut self, hover: Option<&Hit>) {
        // An incomplete segment is always the last element; it goes first.
        if self.kind == PrimitiveKind::Segment {
            if let Some(Primitive::Segment { b: None, .. }) = self.primitives.last() {
                self.primitives.pop();
                return;
            }
        }

        let Some(hit) = hover else { return };
        let Some(primitive) = self.primitives.get_mut(hit.element) else {
            return;
        };

        match (primitive, hit.vertex) {
            (Primitive::Point(_), _) => {
                self.primitives.remove(hit.element);
            }
            (Primitive::Segment { a, b }, Some(j)) => {
                let survivor = if j == 0 { b.unwrap_or(*a) } else { *a };
                self.primitives.remove(hit.element);
                self.primitives.push(Primitive::Point(survivor));
            }
            (Primitive::Segment { .. }, None) => {
                self.primitives.remove(hit.element);
            }
            (Primitive::Polygon { vertices, closed }, Some(j)) => {
                let last = vertices.len().saturating_sub(1);
                if *closed && (j == 0 || j == last) {
                    // The shared vertex: both copies go, then re-close on
                    // the new first vertex if enough remain.
                    vertices.remove(last);
                    vertices.remove(0);
                    if vertices.len() >= 3 {
                        let first = vertices[0];
                        vertices.push(first);
                    } else {
                        *closed = false;
                    }
                } else if j < vertices.len() {
                    vertices.remove(j);
                }
            }
            (Primitive::Polygon { .. }, None) => {}
        }
    }

    /// Lengths of all complete segments in physical units.
    pub fn segment_lengths(&self, spacing: PixelSpacing) -> Vec<f64> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Segment { a, b: Some(b) } => {
                    Some(physical_distance(*a, *b, spacing))
                }
                _ => None,
            })
            .collect()
    }
}
