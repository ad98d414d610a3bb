//! Delaunay triangulation of blend thresholds (Bowyer–Watson).
//!
//! Threshold sets are tiny (a handful of clips), so the quadratic incremental
//! algorithm is fine. Output triangles have sorted corner indices and are sorted
//! themselves, which keeps weight lookups deterministic across runs.

use super::Vec2;

type P = [f64; 2];

const DEGENERATE_AREA: f64 = 1e-12;

#[inline]
fn orient(a: P, b: P, c: P) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// True when `p` lies strictly inside the circumcircle of `abc`.
fn in_circumcircle(a: P, b: P, c: P, p: P) -> bool {
    let (ax, ay) = (a[0] - p[0], a[1] - p[1]);
    let (bx, by) = (b[0] - p[0], b[1] - p[1]);
    let (cx, cy) = (c[0] - p[0], c[1] - p[1]);
    let det = (ax * ax + ay * ay) * (bx * cy - cx * by) - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);
    let o = orient(a, b, c);
    if o > 0.0 {
        det > 1e-12
    } else if o < 0.0 {
        det < -1e-12
    } else {
        false
    }
}

/// Triangulate `points`, returning corner indices into `points`.
/// Fewer than three points, or all points collinear, yield no triangles.
pub fn triangulate(points: &[Vec2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut vertices: Vec<P> = points.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for v in &vertices {
        min_x = min_x.min(v[0]);
        min_y = min_y.min(v[1]);
        max_x = max_x.max(v[0]);
        max_y = max_y.max(v[1]);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let mid = [(min_x + max_x) * 0.5, (min_y + max_y) * 0.5];
    vertices.push([mid[0] - 20.0 * span, mid[1] - span]);
    vertices.push([mid[0], mid[1] + 20.0 * span]);
    vertices.push([mid[0] + 20.0 * span, mid[1] - span]);

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for i in 0..n {
        let p = vertices[i];
        let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|t| in_circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]], p));

        // Boundary of the cavity: edges that belong to exactly one bad triangle.
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for t in &bad {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let shared = bad.iter().any(|other| {
                    other != t && other.contains(&a) && other.contains(&b)
                });
                if !shared {
                    edges.push((a, b));
                }
            }
        }

        triangles = good;
        for (a, b) in edges {
            if orient(vertices[a], vertices[b], p).abs() > DEGENERATE_AREA {
                triangles.push([a, b, i]);
            }
        }
    }

    let mut result: Vec<[usize; 3]> = triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < n))
        .filter(|t| orient(vertices[t[0]], vertices[t[1]], vertices[t[2]]).abs() > DEGENERATE_AREA)
        .map(|mut t| {
            t.sort_unstable();
            t
        })
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_triangle() {
        let tris = triangulate(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn square_splits_into_two_triangles() {
        let tris = triangulate(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn centered_point_fans_out() {
        let tris = triangulate(&[[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0], [0.0, 0.0]]);
        assert_eq!(tris.len(), 4);
        assert!(tris.iter().all(|t| t.contains(&4)));
    }

    #[test]
    fn collinear_points_have_no_triangles() {
        assert!(triangulate(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]).is_empty());
    }
}
