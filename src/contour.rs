//! Contour extraction from binary masks.
//!
//! Derives closed polyline boundaries from the annotation masks using Moore
//! neighborhood tracing. Every 8-connected foreground component contributes
//! one outer boundary; enclosed background pockets contribute hole
//! boundaries. [`ExtractionMode`] selects whether holes are kept
//! (ring-shaped strokes render as rings) or dropped (interior gaps are
//! filled visually).
//!
//! Contours are pure derived data: recomputed on demand, never mutated.

use ndarray::{Array2, ArrayView2};

use crate::error::{AnnotationError, AnnotationResult};

/// Which boundaries to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Keep internal hole boundaries alongside outer ones.
    AllBoundaries,
    /// Report only outermost boundaries, one per component.
    OuterOnly,
}

/// Whether a contour bounds a component from the outside or rings a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    Outer,
    Hole,
}

/// Ordered closed sequence of pixel coordinates (`(x, y)`) bounding one
/// connected component of a binary mask.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<(i32, i32)>,
    pub kind: ContourKind,
}

impl Contour {
    /// Mean of the boundary coordinates, truncated to pixel coordinates.
    pub fn centroid(&self) -> (i32, i32) {
        if self.points.is_empty() {
            return (0, 0);
        }
        let n = self.points.len() as i64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0i64, 0i64), |(sx, sy), &(x, y)| (sx + x as i64, sy + y as i64));
        ((sx / n) as i32, (sy / n) as i32)
    }
}

#[inline]
fn is_set(mask: ArrayView2<u8>, x: i32, y: i32) -> bool {
    let (height, width) = mask.dim();
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
        && mask[[y as usize, x as usize]] > 0
}

/// A set pixel with at least one unset 4-connected neighbor.
#[inline]
fn is_boundary(mask: ArrayView2<u8>, x: i32, y: i32) -> bool {
    is_set(mask, x, y)
        && (!is_set(mask, x - 1, y)
            || !is_set(mask, x + 1, y)
            || !is_set(mask, x, y - 1)
            || !is_set(mask, x, y + 1))
}

/// Moore neighborhood directions (8-connected, clockwise from right).
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // 0: right
    (1, 1),   // 1: down-right
    (0, 1),   // 2: down
    (-1, 1),  // 3: down-left
    (-1, 0),  // 4: left
    (-1, -1), // 5: up-left
    (0, -1),  // 6: up
    (1, -1),  // 7: up-right
];

/// Trace one closed boundary loop starting at `(start_x, start_y)`.
///
/// `backtrack_dir` must point at an unset neighbor of the start pixel; for
/// outer boundaries that is any free direction, for hole boundaries it is
/// the direction of the hole itself, which steers the trace around the hole.
fn trace_boundary(
    mask: ArrayView2<u8>,
    start_x: i32,
    start_y: i32,
    backtrack_dir: usize,
) -> AnnotationResult<Vec<(i32, i32)>> {
    let (height, width) = mask.dim();
    let mut contour = Vec::new();

    let mut x = start_x;
    let mut y = start_y;
    let mut dir = backtrack_dir;

    let max_steps = width * height * 2;
    let mut steps = 0usize;

    loop {
        if contour.last() != Some(&(x, y)) {
            contour.push((x, y));
        }

        // Search clockwise starting just past the backtrack direction.
        let search_start = (dir + 5) % 8;

        let mut found = false;
        for i in 0..8 {
            let check_dir = (search_start + i) % 8;
            let (dx, dy) = DIRECTIONS[check_dir];
            let nx = x + dx;
            let ny = y + dy;

            if is_set(mask, nx, ny) {
                if nx == start_x && ny == start_y && steps > 0 {
                    return Ok(contour);
                }
                if is_boundary(mask, nx, ny) {
                    x = nx;
                    y = ny;
                    dir = check_dir;
                    found = true;
                    break;
                }
            }
        }

        if !found {
            // Isolated pixel: the loop is the pixel itself.
            return Ok(contour);
        }

        steps += 1;
        if steps >= max_steps {
            return Err(AnnotationError::DegenerateMask(format!(
                "boundary trace from ({start_x}, {start_y}) overran {max_steps} steps"
            )));
        }
    }
}

/// Label connected components of a binary mask.
///
/// Returns a raster of component ids (0 = background, ids start at 1) and
/// the component count. `eight_connected` selects the neighborhood.
pub fn connected_components(mask: ArrayView2<u8>, eight_connected: bool) -> (Array2<u32>, u32) {
    let (height, width) = mask.dim();
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut next_label = 0u32;

    let neighbors: &[(i32, i32)] = if eight_connected {
        &DIRECTIONS
    } else {
        &[(1, 0), (-1, 0), (0, 1), (0, -1)]
    };

    let mut queue = std::collections::VecDeque::new();
    for sy in 0..height {
        for sx in 0..width {
            if mask[[sy, sx]] == 0 || labels[[sy, sx]] != 0 {
                continue;
            }
            next_label += 1;
            labels[[sy, sx]] = next_label;
            queue.push_back((sx, sy));

            while let Some((x, y)) = queue.pop_front() {
                for &(dx, dy) in neighbors {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                        let (nx, ny) = (nx as usize, ny as usize);
                        if mask[[ny, nx]] > 0 && labels[[ny, nx]] == 0 {
                            labels[[ny, nx]] = next_label;
                            queue.push_back((nx, ny));
                        }
                    }
                }
            }
        }
    }

    (labels, next_label)
}

/// Extract the boundary contours of a binary mask.
///
/// Each 8-connected component yields one `Outer` contour, traced from its
/// topmost-leftmost pixel. With [`ExtractionMode::AllBoundaries`] every
/// enclosed background pocket additionally yields a `Hole` contour traced
/// along the surrounding foreground.
///
/// A trace that overruns its step limit is logged and skipped; extraction
/// itself never fails.
pub fn extract_contours(mask: ArrayView2<u8>, mode: ExtractionMode) -> Vec<Contour> {
    let (height, width) = mask.dim();
    if height == 0 || width == 0 {
        return Vec::new();
    }

    let mut contours = Vec::new();

    // Outer boundaries: one per foreground component, started at the first
    // pixel in scan order (always on the outer boundary).
    let (labels, count) = connected_components(mask, true);
    let mut seen = vec![false; count as usize + 1];
    'scan: for y in 0..height {
        for x in 0..width {
            let id = labels[[y, x]] as usize;
            if id == 0 || seen[id] {
                continue;
            }
            seen[id] = true;

            // First free direction is the backtrack for the outer trace.
            let (px, py) = (x as i32, y as i32);
            let backtrack = DIRECTIONS
                .iter()
                .position(|&(dx, dy)| !is_set(mask, px + dx, py + dy))
                .unwrap_or(0);

            match trace_boundary(mask, px, py, backtrack) {
                Ok(points) => contours.push(Contour {
                    points,
                    kind: ContourKind::Outer,
                }),
                Err(err) => log::warn!("contour extraction skipped a component: {err}"),
            }

            if seen.iter().skip(1).all(|&s| s) {
                break 'scan;
            }
        }
    }

    if mode == ExtractionMode::AllBoundaries {
        // Hole boundaries: background pockets that do not reach the border.
        let inverse = mask.mapv(|v| u8::from(v == 0));
        let (bg_labels, bg_count) = connected_components(inverse.view(), false);

        let mut touches_border = vec![false; bg_count as usize + 1];
        for x in 0..width {
            touches_border[bg_labels[[0, x]] as usize] = true;
            touches_border[bg_labels[[height - 1, x]] as usize] = true;
        }
        for y in 0..height {
            touches_border[bg_labels[[y, 0]] as usize] = true;
            touches_border[bg_labels[[y, width - 1]] as usize] = true;
        }

        for id in 1..=bg_count as usize {
            if touches_border[id] {
                continue;
            }

            // Inner rim: foreground pixels 4-adjacent to this pocket. They
            // form a closed 8-connected loop around the hole, so tracing
            // the rim raster alone keeps the trace off the outer boundary.
            let mut rim = Array2::<u8>::zeros((height, width));
            let mut start = None;
            for y in 0..height {
                for x in 0..width {
                    if mask[[y, x]] == 0 {
                        continue;
                    }
                    let adjacent = [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)]
                        .iter()
                        .any(|&(dx, dy)| {
                            let nx = x as i32 + dx;
                            let ny = y as i32 + dy;
                            nx >= 0
                                && ny >= 0
                                && (nx as usize) < width
                                && (ny as usize) < height
                                && bg_labels[[ny as usize, nx as usize]] as usize == id
                        });
                    if adjacent {
                        rim[[y, x]] = 1;
                        if start.is_none() {
                            start = Some((x as i32, y as i32));
                        }
                    }
                }
            }

            let Some((px, py)) = start else { continue };
            let backtrack = DIRECTIONS
                .iter()
                .position(|&(dx, dy)| !is_set(rim.view(), px + dx, py + dy))
                .unwrap_or(0);

            match trace_boundary(rim.view(), px, py, backtrack) {
                Ok(points) => contours.push(Contour {
                    points,
                    kind: ContourKind::Hole,
                }),
                Err(err) => log::warn!("hole trace skipped: {err}"),
            }
        }
    }

    contours
}

/// Fill enclosed background pockets of a binary mask.
///
/// Background is flooded 4-connected from the image border; anything the
/// flood cannot reach is inside some component and becomes foreground.
pub fn fill_holes(mask: ArrayView2<u8>) -> Array2<u8> {
    let (height, width) = mask.dim();
    if height == 0 || width == 0 {
        return mask.to_owned();
    }

    let mut reachable = Array2::<u8>::zeros((height, width));
    let mut queue = std::collections::VecDeque::new();

    for x in 0..width {
        for y in [0, height - 1] {
            if mask[[y, x]] == 0 && reachable[[y, x]] == 0 {
                reachable[[y, x]] = 1;
                queue.push_back((x, y));
            }
        }
    }
    for y in 0..height {
        for x in [0, width - 1] {
            if mask[[y, x]] == 0 && reachable[[y, x]] == 0 {
                reachable[[y, x]] = 1;
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                let (nx, ny) = (nx as usize, ny as usize);
                if mask[[ny, nx]] == 0 && reachable[[ny, nx]] == 0 {
                    reachable[[ny, nx]] = 1;
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    let mut filled = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            filled[[y, x]] = u8::from(mask[[y, x]] > 0 || reachable[[y, x]] == 0);
        }
    }
    filled
}
