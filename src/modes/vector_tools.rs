//! Vector annotation tools: distance measurement, polygon outlines, and
//! free keypoints.
//!
//! All three share one pointer-interaction core: a primary click places a
//! point unless it lands within the correction radius of an existing
//! element, in which case it grabs that element for dragging; a secondary
//! click removes the hovered element. The tools differ only in which
//! primitive kind they edit and how they draw it.

use ndarray::Array3;

use crate::controller::{
    AnnotationMode, Button, InteractionState, Modifiers, SessionContext, WheelDirection,
};
use crate::draw;
use crate::geometry::PixelSpacing;
use crate::overlay::{COLOR_CURSOR, COLOR_POSITIVE};
use crate::vector::{Hit, Primitive, PrimitiveKind, VectorStore, CURSOR_SIZE};

fn px(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

/// Pointer-interaction core shared by the vector modes.
struct VectorInteraction {
    store: VectorStore,
    state: InteractionState,
    hover: Option<Hit>,
}

impl VectorInteraction {
    fn new(kind: PrimitiveKind) -> Self {
        Self {
            store: VectorStore::new(kind),
            state: InteractionState::default(),
            hover: None,
        }
    }

    fn update_hover(&mut self, pos: (f64, f64)) {
        let radius = self.store.kind().correction_radius();
        self.hover = self
            .store
            .nearest_element(pos)
            .filter(|hit| hit.within(radius));
    }

    fn pointer_down(&mut self, button: Button, pos: (f64, f64)) {
        self.state.pointer = pos;
        self.update_hover(pos);

        match button {
            Button::Primary => {
                self.state.pointer_down = true;
                match self.hover {
                    Some(hit) if self.store.hits_active_polygon_start(&hit) => {
                        if let Err(err) = self.store.close_polygon() {
                            log::debug!("polygon not closed: {err}");
                        }
                        self.hover = None;
                    }
                    Some(hit) => self.state.drag_target = Some(hit),
                    None => self.store.place_point(pos),
                }
            }
            Button::Secondary => {
                self.store.remove_element(self.hover.as_ref());
                // Indices may have shifted.
                self.update_hover(pos);
            }
        }
    }

    fn pointer_up(&mut self) {
        self.state.pointer_down = false;
        self.state.drag_target = None;
    }

    fn pointer_move(&mut self, pos: (f64, f64)) {
        let dx = pos.0 - self.state.pointer.0;
        let dy = pos.1 - self.state.pointer.1;
        self.state.pointer = pos;

        if self.state.pointer_down {
            if let Some(hit) = self.state.drag_target {
                self.store.move_element(&hit, dx, dy);
            }
        } else {
            self.update_hover(pos);
        }
    }

    fn element_color(&self, element: usize) -> [u8; 3] {
        match self.hover {
            Some(hit) if hit.element == element => COLOR_CURSOR,
            _ => COLOR_POSITIVE,
        }
    }

    fn draw_cursor(&self, frame: &mut Array3<u8>) {
        draw::stroke_circle(frame, px(self.state.pointer), CURSOR_SIZE, 1, COLOR_CURSOR);
    }
}

macro_rules! forward_interaction {
    () => {
        fn on_pointer_down(
            &mut self,
            _ctx: &SessionContext,
            button: Button,
            pos: (f64, f64),
            _modifiers: Modifiers,
        ) {
            self.inner.pointer_down(button, pos);
        }

        fn on_pointer_up(&mut self, _ctx: &SessionContext, _button: Button) {
            self.inner.pointer_up();
        }

        fn on_pointer_move(&mut self, _ctx: &SessionContext, pos: (f64, f64)) {
            self.inner.pointer_move(pos);
        }

        fn on_wheel(&mut self, _ctx: &SessionContext, _direction: WheelDirection) {}

        fn on_key(&mut self, _ctx: &SessionContext, _code: u8) {}
    };
}

/// Two-point physical distance measurement.
pub struct DistanceMode {
    inner: VectorInteraction,
}

impl DistanceMode {
    pub fn new() -> Self {
        Self {
            inner: VectorInteraction::new(PrimitiveKind::Segment),
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.inner.store
    }

    /// Lengths of all complete segments in physical units.
    pub fn measurements(&self, spacing: PixelSpacing) -> Vec<f64> {
        self.inner.store.segment_lengths(spacing)
    }
}

impl Default for DistanceMode {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationMode for DistanceMode {
    forward_interaction!();

    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
        let mut frame = draw::gray_to_rgb(ctx.image.view());

        for (i, primitive) in self.inner.store.primitives().iter().enumerate() {
            let color = self.inner.element_color(i);
            match primitive {
                Primitive::Segment { a, b } => {
                    match b {
                        Some(b) => draw::stroke_line(&mut frame, px(*a), px(*b), color),
                        // Rubber band from the placed endpoint to the pointer.
                        None => draw::stroke_line(
                            &mut frame,
                            px(*a),
                            px(self.inner.state.pointer),
                            color,
                        ),
                    }
                    draw::fill_disc(&mut frame, px(*a), CURSOR_SIZE, color);
                    if let Some(b) = b {
                        draw::fill_disc(&mut frame, px(*b), CURSOR_SIZE, color);
                    }
                }
                // A removed endpoint leaves its survivor as a free point;
                // it stays visible and grabbable.
                Primitive::Point(p) => {
                    draw::fill_disc(&mut frame, px(*p), CURSOR_SIZE, color);
                }
                Primitive::Polygon { .. } => {}
            }
        }

        self.inner.draw_cursor(&mut frame);
        frame
    }
}

/// Closed-outline annotation.
pub struct PolygonMode {
    inner: VectorInteraction,
}

impl PolygonMode {
    pub fn new() -> Self {
        Self {
            inner: VectorInteraction::new(PrimitiveKind::Polygon),
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.inner.store
    }
}

impl Default for PolygonMode {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationMode for PolygonMode {
    forward_interaction!();

    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
        let mut frame = draw::gray_to_rgb(ctx.image.view());

        for (i, primitive) in self.inner.store.primitives().iter().enumerate() {
            let color = self.inner.element_color(i);
            if let Primitive::Polygon { vertices, closed } = primitive {
                for pair in vertices.windows(2) {
                    draw::stroke_line(&mut frame, px(pair[0]), px(pair[1]), color);
                }
                if !*closed {
                    // Rubber band the open end to the pointer.
                    if let Some(last) = vertices.last() {
                        draw::stroke_line(
                            &mut frame,
                            px(*last),
                            px(self.inner.state.pointer),
                            color,
                        );
                    }
                }
                for v in vertices {
                    draw::fill_disc(&mut frame, px(*v), CURSOR_SIZE - 1, color);
                }
            }
        }

        self.inner.draw_cursor(&mut frame);
        frame
    }
}

/// Free landmark points.
pub struct KeypointMode {
    inner: VectorInteraction,
}

impl KeypointMode {
    pub fn new() -> Self {
        Self {
            inner: VectorInteraction::new(PrimitiveKind::Keypoint),
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.inner.store
    }
}

impl Default for KeypointMode {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationMode for KeypointMode {
    forward_interaction!();

    fn render_overlay(&self, ctx: &SessionContext) -> Array3<u8> {
        let mut frame = draw::gray_to_rgb(ctx.image.view());

        for (i, primitive) in self.inner.store.primitives().iter().enumerate() {
            if let Primitive::Point(p) = primitive {
                draw::fill_disc(&mut frame, px(*p), CURSOR_SIZE, self.inner.element_color(i));
            }
        }

        self.inner.draw_cursor(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn context() -> SessionContext {
        SessionContext::new(Array2::<u8>::zeros((32, 32)), PixelSpacing::default())
    }

    fn click<M: AnnotationMode>(mode: &mut M, ctx: &SessionContext, button: Button, x: f64, y: f64) {
        mode.on_pointer_down(ctx, button, (x, y), Modifiers::default());
        mode.on_pointer_up(ctx, button);
    }

    #[test]
    fn test_distance_two_clicks_measure() {
        let ctx = context();
        let mut mode = DistanceMode::new();
        click(&mut mode, &ctx, Button::Primary, 4.0, 10.0);
        click(&mut mode, &ctx, Button::Primary, 14.0, 10.0);

        let lengths = mode.measurements(PixelSpacing::default());
        assert_eq!(lengths.len(), 1);
        assert_relative_eq!(lengths[0], 10.0);
    }

    #[test]
    fn test_distance_endpoint_drag() {
        let ctx = context();
        let mut mode = DistanceMode::new();
        click(&mut mode, &ctx, Button::Primary, 4.0, 10.0);
        click(&mut mode, &ctx, Button::Primary, 14.0, 10.0);

        // Grab the second endpoint and drag it 6 px right.
        mode.on_pointer_down(&ctx, Button::Primary, (14.0, 10.0), Modifiers::default());
        mode.on_pointer_move(&ctx, (20.0, 10.0));
        mode.on_pointer_up(&ctx, Button::Primary);

        let lengths = mode.measurements(PixelSpacing::default());
        assert_relative_eq!(lengths[0], 16.0);
    }

    #[test]
    fn test_distance_body_drag_translates_whole_segment() {
        let ctx = context();
        let mut mode = DistanceMode::new();
        click(&mut mode, &ctx, Button::Primary, 4.0, 10.0);
        click(&mut mode, &ctx, Button::Primary, 14.0, 10.0);

        mode.on_pointer_down(&ctx, Button::Primary, (9.0, 11.0), Modifiers::default());
        mode.on_pointer_move(&ctx, (9.0, 16.0));
        mode.on_pointer_up(&ctx, Button::Primary);

        assert_eq!(
            mode.store().primitives()[0],
            Primitive::Segment {
                a: (4.0, 15.0),
                b: Some((14.0, 15.0)),
            }
        );
    }

    #[test]
    fn test_surviving_endpoint_stays_visible() {
        let ctx = context();
        let mut mode = DistanceMode::new();
        click(&mut mode, &ctx, Button::Primary, 4.0, 10.0);
        click(&mut mode, &ctx, Button::Primary, 14.0, 10.0);

        // Removing one endpoint degenerates the segment to a free point.
        click(&mut mode, &ctx, Button::Secondary, 4.0, 10.0);
        assert_eq!(mode.store().primitives()[0], Primitive::Point((14.0, 10.0)));

        // The survivor is drawn, not just hit-testable.
        let frame = mode.render_overlay(&ctx);
        assert_eq!(frame[[10, 14, 1]], 255);
    }

    #[test]
    fn test_click_outside_correction_radius_places_instead_of_grabbing() {
        let ctx = context();
        let mut mode = KeypointMode::new();
        click(&mut mode, &ctx, Button::Primary, 10.0, 10.0);
        // 7 px away, beyond the keypoint correction radius of 6.
        click(&mut mode, &ctx, Button::Primary, 17.0, 10.0);
        assert_eq!(mode.store().len(), 2);

        // 5 px away grabs instead of placing.
        mode.on_pointer_down(&ctx, Button::Primary, (12.0, 10.0), Modifiers::default());
        mode.on_pointer_move(&ctx, (12.0, 20.0));
        mode.on_pointer_up(&ctx, Button::Primary);
        assert_eq!(mode.store().len(), 2);
        assert_eq!(mode.store().primitives()[0], Primitive::Point((10.0, 20.0)));
    }

    #[test]
    fn test_secondary_removes_hovered_keypoint() {
        let ctx = context();
        let mut mode = KeypointMode::new();
        click(&mut mode, &ctx, Button::Primary, 10.0, 10.0);
        click(&mut mode, &ctx, Button::Secondary, 11.0, 10.0);
        assert!(mode.store().is_empty());

        // Out of range: nothing happens.
        click(&mut mode, &ctx, Button::Primary, 10.0, 10.0);
        click(&mut mode, &ctx, Button::Secondary, 25.0, 25.0);
        assert_eq!(mode.store().len(), 1);
    }

    #[test]
    fn test_polygon_closes_on_start_vertex_click() {
        let ctx = context();
        let mut mode = PolygonMode::new();
        click(&mut mode, &ctx, Button::Primary, 5.0, 5.0);
        click(&mut mode, &ctx, Button::Primary, 25.0, 5.0);
        click(&mut mode, &ctx, Button::Primary, 25.0, 25.0);
        // Within the polygon correction radius of the first vertex.
        click(&mut mode, &ctx, Button::Primary, 7.0, 6.0);

        let primitives = mode.store().primitives();
        assert_eq!(primitives.len(), 2);
        assert_eq!(
            primitives[0],
            Primitive::Polygon {
                vertices: vec![
                    (5.0, 5.0),
                    (25.0, 5.0),
                    (25.0, 25.0),
                    (5.0, 5.0),
                ],
                closed: true,
            }
        );
        assert!(matches!(
            primitives[1],
            Primitive::Polygon { closed: false, ref vertices } if vertices.is_empty()
        ));
    }

    #[test]
    fn test_polygon_closure_needs_three_vertices() {
        let ctx = context();
        let mut mode = PolygonMode::new();
        click(&mut mode, &ctx, Button::Primary, 5.0, 5.0);
        click(&mut mode, &ctx, Button::Primary, 25.0, 5.0);
        click(&mut mode, &ctx, Button::Primary, 6.0, 5.0);

        assert_eq!(mode.store().len(), 1);
        assert!(matches!(
            mode.store().primitives()[0],
            Primitive::Polygon { closed: false, .. }
        ));
    }

    #[test]
    fn test_render_overlays_have_image_shape() {
        let ctx = context();
        let mut distance = DistanceMode::new();
        click(&mut distance, &ctx, Button::Primary, 4.0, 10.0);
        assert_eq!(distance.render_overlay(&ctx).dim(), (32, 32, 3));

        let keypoint = KeypointMode::new();
        assert_eq!(keypoint.render_overlay(&ctx).dim(), (32, 32, 3));

        let polygon = PolygonMode::new();
        assert_eq!(polygon.render_overlay(&ctx).dim(), (32, 32, 3));
    }
}
