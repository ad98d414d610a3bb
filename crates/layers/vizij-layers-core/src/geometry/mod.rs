//! 2D geometry used by the blend tree: projections, barycentric coordinates and
//! the weight assignment for a blend point against a set of thresholds.

pub mod triangulation;

use crate::interp::functions::saturate;

pub use triangulation::triangulate;

pub type Vec2 = [f32; 2];

const INSIDE_EPSILON: f32 = 1e-5;

#[inline]
fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
fn dot(a: Vec2, b: Vec2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    let d = sub(a, b);
    dot(d, d)
}

/// Project `p` onto segment `ab`, returning the 0–1 ratio along the segment and
/// the closest point.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (f32, Vec2) {
    let ab = sub(b, a);
    let len_sq = dot(ab, ab);
    if len_sq <= f32::MIN_POSITIVE {
        return (0.0, a);
    }
    let t = saturate(dot(sub(p, a), ab) / len_sq);
    (t, [a[0] + ab[0] * t, a[1] + ab[1] * t])
}

/// Barycentric coordinates of `p` relative to triangle `abc`.
/// `None` for degenerate (zero area) triangles.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<[f32; 3]> {
    let v0 = sub(b, a);
    let v1 = sub(c, a);
    let v2 = sub(p, a);
    let d00 = dot(v0, v0);
    let d01 = dot(v0, v1);
    let d11 = dot(v1, v1);
    let d20 = dot(v2, v0);
    let d21 = dot(v2, v1);
    let denom = d00 * d11 - d01 * d01;
    // Relative to the edge lengths so tiny but valid triangles are kept.
    if denom.abs() <= f32::EPSILON * d00 * d11 {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some([1.0 - v - w, v, w])
}

#[inline]
fn is_inside(bary: &[f32; 3]) -> bool {
    bary.iter().all(|w| *w >= -INSIDE_EPSILON)
}

/// Clamp negative coordinates away and renormalize to sum 1.
fn normalize_weights(bary: [f32; 3]) -> [f32; 3] {
    let clamped = bary.map(|w| w.max(0.0));
    let sum: f32 = clamped.iter().sum();
    if sum <= f32::EPSILON {
        return [1.0, 0.0, 0.0];
    }
    clamped.map(|w| w / sum)
}

/// Compute one weight per threshold for blend point `p`.
///
/// * one threshold: weight 1
/// * two thresholds: ratio along the segment between them
/// * three or more: barycentric weights of the containing triangle; outside every
///   triangle the closest point on any triangle edge is used instead. Ties keep
///   the lowest triangle index, then the first edge.
///
/// Collinear threshold sets (no triangles) fall back to the closest segment
/// between any two thresholds, preferring the shorter segment on ties.
pub fn blend_weights(thresholds: &[Vec2], triangles: &[[usize; 3]], p: Vec2) -> Vec<f32> {
    let mut weights = vec![0.0; thresholds.len()];
    match thresholds.len() {
        0 => {}
        1 => weights[0] = 1.0,
        2 => {
            let (t, _) = closest_point_on_segment(p, thresholds[0], thresholds[1]);
            weights[0] = 1.0 - t;
            weights[1] = t;
        }
        _ if triangles.is_empty() => segment_fallback(thresholds, p, &mut weights),
        _ => triangle_weights(thresholds, triangles, p, &mut weights),
    }
    weights
}

fn triangle_weights(thresholds: &[Vec2], triangles: &[[usize; 3]], p: Vec2, out: &mut [f32]) {
    let corners = |tri: &[usize; 3]| (thresholds[tri[0]], thresholds[tri[1]], thresholds[tri[2]]);

    for tri in triangles {
        let (a, b, c) = corners(tri);
        if let Some(bary) = barycentric(p, a, b, c) {
            if is_inside(&bary) {
                assign(tri, normalize_weights(bary), out);
                return;
            }
        }
    }

    let mut best: Option<(f32, usize, Vec2)> = None;
    for (index, tri) in triangles.iter().enumerate() {
        let (a, b, c) = corners(tri);
        for (start, end) in [(a, b), (b, c), (c, a)] {
            let (_, point) = closest_point_on_segment(p, start, end);
            let dist = distance_sq(p, point);
            if best.map_or(true, |(best_dist, _, _)| dist < best_dist) {
                best = Some((dist, index, point));
            }
        }
    }

    if let Some((_, index, point)) = best {
        let tri = &triangles[index];
        let (a, b, c) = corners(tri);
        let bary = barycentric(point, a, b, c).unwrap_or([1.0, 0.0, 0.0]);
        assign(tri, normalize_weights(bary), out);
    }
}

fn assign(tri: &[usize; 3], bary: [f32; 3], out: &mut [f32]) {
    for (corner, weight) in tri.iter().zip(bary) {
        out[*corner] = weight;
    }
}

fn segment_fallback(thresholds: &[Vec2], p: Vec2, out: &mut [f32]) {
    let mut best: Option<(f32, f32, usize, usize, f32)> = None;
    for i in 0..thresholds.len() {
        for j in (i + 1)..thresholds.len() {
            let (t, point) = closest_point_on_segment(p, thresholds[i], thresholds[j]);
            let dist = distance_sq(p, point);
            let len = distance_sq(thresholds[i], thresholds[j]);
            let better = match best {
                None => true,
                Some((best_dist, best_len, ..)) => {
                    let tolerance = f32::EPSILON * dist.max(best_dist);
                    dist < best_dist - tolerance
                        || ((dist - best_dist).abs() <= tolerance && len < best_len)
                }
            };
            if better {
                best = Some((dist, len, i, j, t));
            }
        }
    }
    if let Some((_, _, i, j, t)) = best {
        out[i] = 1.0 - t;
        out[j] = t;
    }
}
