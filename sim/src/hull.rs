//! Convex hull by gift wrapping (Jarvis march).
//!
//! Coordinates are screen space (y down). The march keeps every input point
//! on the non-negative side of `cross(next - current, p - current)`, which
//! traces the hull clockwise on screen. The first vertex is the leftmost
//! point, lowest `y` on ties.

use crate::components::Vec2;

/// Hull vertices of `points`, first vertex leftmost.
///
/// Degenerate inputs:
/// - no points: empty hull
/// - every point identical: that single point
/// - all points collinear: the two extreme endpoints
///
/// Collinear ties always go to the farther point, so no vertex lies in the
/// interior of a hull edge. The march never takes more than `points.len()`
/// steps, whatever the input.
pub fn gift_wrap(points: &[Vec2]) -> Vec<Vec2> {
    let Some(start) = leftmost(points) else {
        return Vec::new();
    };

    let mut hull = vec![start];
    let mut current = start;

    for _ in 0..points.len() {
        let Some(next) = next_vertex(points, current) else {
            // Every point coincides with `current`.
            break;
        };
        if next == start {
            break;
        }
        hull.push(next);
        current = next;
    }

    hull
}

fn leftmost(points: &[Vec2]) -> Option<Vec2> {
    points.iter().copied().reduce(|best, p| {
        if p.x < best.x || (p.x == best.x && p.y < best.y) {
            p
        } else {
            best
        }
    })
}

/// The point such that no other lies strictly on the negative side of the
/// line from `current` to it.
fn next_vertex(points: &[Vec2], current: Vec2) -> Option<Vec2> {
    let mut candidate: Option<Vec2> = None;

    for &p in points {
        if p == current {
            continue;
        }
        let Some(c) = candidate else {
            candidate = Some(p);
            continue;
        };

        let turn = (c - current).cross(p - current);
        let farther = current.sqr_distance(p) > current.sqr_distance(c);
        if turn < 0.0 || (turn == 0.0 && farther) {
            candidate = Some(p);
        }
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(raw: &[(f32, f32)]) -> Vec<Vec2> {
        raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[test]
    fn test_square() {
        let hull = gift_wrap(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn test_square_input_order_does_not_matter() {
        let hull = gift_wrap(&pts(&[(10.0, 10.0), (0.0, 10.0), (5.0, 5.0), (10.0, 0.0), (0.0, 0.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(gift_wrap(&[]).is_empty());
        assert_eq!(gift_wrap(&pts(&[(3.0, 4.0)])), pts(&[(3.0, 4.0)]));
        // Stacked agents collapse to one point instead of looping.
        assert_eq!(gift_wrap(&pts(&[(3.0, 4.0), (3.0, 4.0), (3.0, 4.0)])), pts(&[(3.0, 4.0)]));
    }

    #[test]
    fn test_collinear_keeps_endpoints_only() {
        let hull = gift_wrap(&pts(&[(5.0, 0.0), (0.0, 0.0), (10.0, 0.0), (2.0, 0.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn test_edge_midpoints_are_skipped() {
        let hull = gift_wrap(&pts(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 5.0),
        ]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn test_duplicates_on_hull() {
        let hull = gift_wrap(&pts(&[(0.0, 0.0), (0.0, 0.0), (4.0, 0.0), (4.0, 0.0), (2.0, 3.0)]));
        assert_eq!(hull.len(), 3);
        assert_eq!(hull[0], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_leftmost_tie_breaks_on_y() {
        let hull = gift_wrap(&pts(&[(0.0, 8.0), (0.0, 2.0), (6.0, 5.0)]));
        assert_eq!(hull[0], Vec2::new(0.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_hull_contains_all_and_is_convex(
            raw in prop::collection::vec((0i32..40, 0i32..40), 1..60)
        ) {
            let points: Vec<Vec2> = raw.iter().map(|&(x, y)| Vec2::new(x as f32, y as f32)).collect();
            let hull = gift_wrap(&points);

            prop_assert!(!hull.is_empty());
            prop_assert!(hull.len() <= points.len());
            for v in &hull {
                prop_assert!(points.contains(v), "vertex {:?} not an input point", v);
            }

            // Every point on or to the non-negative side of every edge.
            let n = hull.len();
            for i in 0..n {
                let a = hull[i];
                let b = hull[(i + 1) % n];
                for &p in &points {
                    prop_assert!((b - a).cross(p - a) >= 0.0, "{:?} outside edge {:?}->{:?}", p, a, b);
                }
            }

            // Strictly convex: every corner turns the same way.
            if n >= 3 {
                for i in 0..n {
                    let a = hull[i];
                    let b = hull[(i + 1) % n];
                    let c = hull[(i + 2) % n];
                    prop_assert!((b - a).cross(c - b) > 0.0);
                }
            }
        }
    }
}
