//! Distance primitives for vector-annotation hit testing and measurement.

/// Physical size of one pixel, as supplied by the image source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSpacing {
    /// Physical distance between adjacent rows.
    pub row: f64,
    /// Physical distance between adjacent columns.
    pub col: f64,
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { row: 1.0, col: 1.0 }
    }
}

/// Euclidean distance between two points in pixels.
pub fn point_distance(p: (f64, f64), q: (f64, f64)) -> f64 {
    let dx = p.0 - q.0;
    let dy = p.1 - q.1;
    (dx * dx + dy * dy).sqrt()
}

/// Distance between two pixel coordinates in physical units:
/// `sqrt((dx * col_spacing)^2 + (dy * row_spacing)^2)`.
pub fn physical_distance(p: (f64, f64), q: (f64, f64), spacing: PixelSpacing) -> f64 {
    let dx = (p.0 - q.0) * spacing.col;
    let dy = (p.1 - q.1) * spacing.row;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the segment `a`-`b`.
///
/// When the projection of `p` onto the segment's line falls strictly
/// between the endpoints, this is the perpendicular distance; otherwise it
/// is the distance to the nearer endpoint. The vector formulation needs no
/// slope, so vertical segments take no special path. A zero-length segment
/// degenerates to plain point distance.
pub fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = vx * vx + vy * vy;
    if len_sq == 0.0 {
        return point_distance(p, a);
    }

    let t = ((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len_sq;
    if t <= 0.0 {
        point_distance(p, a)
    } else if t >= 1.0 {
        point_distance(p, b)
    } else {
        let (cx, cy) = (a.0 + t * vx, a.1 + t * vy);
        point_distance(p, (cx, cy))
    }
}

/// Whether the projection of `p` onto the line through `a`-`b` falls
/// strictly between the endpoints (the hit counts as the segment body
/// rather than an endpoint).
pub fn projects_onto_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = vx * vx + vy * vy;
    if len_sq == 0.0 {
        return false;
    }
    let t = ((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len_sq;
    t > 0.0 && t < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_physical_distance_unit_spacing() {
        let d = physical_distance((0.0, 0.0), (3.0, 4.0), PixelSpacing::default());
        assert_relative_eq!(d, 5.0);
    }

    #[test]
    fn test_physical_distance_anisotropic() {
        // Row spacing 2: sqrt((3*1)^2 + (4*2)^2) = sqrt(73).
        let spacing = PixelSpacing { row: 2.0, col: 1.0 };
        let d = physical_distance((0.0, 0.0), (3.0, 4.0), spacing);
        assert_relative_eq!(d, 73.0f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(d, 8.544, max_relative = 1e-4);
    }

    #[test]
    fn test_segment_distance_perpendicular() {
        let d = point_segment_distance((5.0, 1.0), (0.0, 0.0), (10.0, 0.0));
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn test_segment_distance_beyond_endpoint() {
        let d = point_segment_distance((12.0, 0.0), (0.0, 0.0), (10.0, 0.0));
        assert_relative_eq!(d, 2.0);
    }

    #[test]
    fn test_segment_distance_vertical() {
        let d = point_segment_distance((3.0, 5.0), (0.0, 0.0), (0.0, 10.0));
        assert_relative_eq!(d, 3.0);
    }

    #[test]
    fn test_segment_distance_degenerate() {
        let d = point_segment_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0));
        assert_relative_eq!(d, 5.0);
    }

    #[test]
    fn test_projection_gate() {
        assert!(projects_onto_segment((5.0, 1.0), (0.0, 0.0), (10.0, 0.0)));
        assert!(!projects_onto_segment((12.0, 0.0), (0.0, 0.0), (10.0, 0.0)));
        assert!(!projects_onto_segment((0.0, 1.0), (0.0, 0.0), (10.0, 0.0)));
    }
}
