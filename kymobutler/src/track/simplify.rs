//! Slope-breakpoint simplification of dense tracks.
//!
//! The service returns one point per frame. Most of those points sit on
//! straight segments, so the polyline is reduced to the vertices where the
//! velocity changes.

use super::TrackPoint;

/// Reduces a dense track to the points where its slope changes.
///
/// Walks consecutive pairs and emits the earlier point of a pair whenever the
/// pair's slope (`Δposition / Δtime`) differs from the slope of the last
/// emitted pair. The last emitted slope starts undefined, so the first point
/// is always kept; the final point is appended unconditionally.
///
/// For dense input `Δtime` is exactly one frame, so this is the same as
/// comparing the signed position deltas. Comparison is exact: values come
/// from integer pixel offsets.
///
/// Inputs with fewer than two points are returned unchanged.
#[must_use = "returns the simplified points"]
pub fn simplify(points: &[TrackPoint]) -> Vec<TrackPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut kept = Vec::new();
    let mut last_slope: Option<f64> = None;

    for pair in points.windows(2) {
        let slope = (pair[1].position - pair[0].position) / (pair[1].time - pair[0].time);

        if last_slope != Some(slope) {
            last_slope = Some(slope);
            kept.push(pair[0]);
        }
    }

    // windows(2) never yields the final point on its own
    kept.push(points[points.len() - 1]);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<TrackPoint> {
        raw.iter().map(|&(t, p)| TrackPoint::new(t, p)).collect()
    }

    #[test]
    fn test_empty_and_single_point_unchanged() {
        assert!(simplify(&[]).is_empty());

        let single = pts(&[(4.0, 2.0)]);
        assert_eq!(simplify(&single), single);
    }

    #[test]
    fn test_two_points_unchanged() {
        let two = pts(&[(0.0, 1.0), (1.0, 5.0)]);
        assert_eq!(simplify(&two), two);
    }

    #[test]
    fn test_constant_slope_collapses_to_endpoints() {
        let dense = pts(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)]);
        assert_eq!(simplify(&dense), pts(&[(0.0, 0.0), (4.0, 8.0)]));
    }

    #[test]
    fn test_stationary_track_collapses_to_endpoints() {
        let dense = pts(&[(10.0, 3.0), (11.0, 3.0), (12.0, 3.0)]);
        assert_eq!(simplify(&dense), pts(&[(10.0, 3.0), (12.0, 3.0)]));
    }

    #[test]
    fn test_slope_change_keeps_breakpoint() {
        let dense = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 2.0), (4.0, 2.0)]);
        assert_eq!(
            simplify(&dense),
            pts(&[(0.0, 0.0), (2.0, 2.0), (4.0, 2.0)])
        );
    }

    #[test]
    fn test_direction_reversal_is_a_breakpoint() {
        let dense = pts(&[(0.0, 5.0), (1.0, 4.0), (2.0, 3.0), (3.0, 4.0), (4.0, 5.0)]);
        assert_eq!(
            simplify(&dense),
            pts(&[(0.0, 5.0), (2.0, 3.0), (4.0, 5.0)])
        );
    }

    #[test]
    fn test_alternating_slope_keeps_every_point() {
        let dense = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 2.0), (4.0, 2.0)]);
        assert_eq!(simplify(&dense), dense);
    }

    #[test]
    fn test_resimplifying_is_idempotent() {
        let dense = pts(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (3.0, 2.0),
            (4.0, 2.0),
            (5.0, 0.0),
            (6.0, -2.0),
        ]);
        let once = simplify(&dense);
        let twice = simplify(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sparse_segments_with_same_delta_but_distinct_slope_survive() {
        // Position moves by 1 on both segments but over different durations.
        let sparse = pts(&[(0.0, 0.0), (1.0, 1.0), (3.0, 2.0)]);
        assert_eq!(simplify(&sparse), sparse);
    }
}
