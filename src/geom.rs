//! n-dimensional point geometry.
//!
//! Points are plain `&[f64]` slices of equal length. Callers guarantee
//! matching dimensions; it is only `debug_assert!`ed.

/// Perpendicular distance from `p` to the infinite line through `q1` and `q2`.
///
/// Decomposes `p - q1` into the part parallel to `q2 - q1` and the
/// orthogonal remainder, and returns the remainder's length:
///
/// ```text
///   t    = dot(p - q1, q2 - q1) / dot(q2 - q1, q2 - q1)
///   dist = |(p - q1) - t·(q2 - q1)|
/// ```
///
/// When `q1 == q2` the denominator is zero and `t` falls back to the raw
/// numerator, which is itself zero in that case, so the distance becomes
/// `|p - q1|`. Runs in two passes over the coordinates without allocating.
pub fn line_to_point_dist(p: &[f64], q1: &[f64], q2: &[f64]) -> f64 {
    debug_assert!(p.len() == q1.len() && q1.len() == q2.len());
    let diffs = || {
        p.iter()
            .zip(q1)
            .zip(q2)
            .map(|((&x, &a), &b)| (x - a, b - a))
    };

    let (numer, denom) = diffs().fold((0.0, 0.0), |(n, d), (off, chord)| {
        (n + off * chord, d + chord * chord)
    });
    let t = if denom != 0.0 { numer / denom } else { numer };

    diffs()
        .map(|(off, chord)| {
            let r = off - t * chord;
            r * r
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_horizontal_line() {
        let d = line_to_point_dist(&[1.0, 10.0], &[0.0, 0.0], &[4.0, 0.0]);
        assert!((d - 10.0).abs() < 1e-12);
    }

    #[test]
    fn point_on_line_has_zero_distance() {
        let d = line_to_point_dist(&[2.0, 2.0, 4.0], &[0.0, 0.0, 0.0], &[1.0, 1.0, 2.0]);
        assert!(d.abs() < 1e-12, "got {d}");
    }

    #[test]
    fn degenerate_chord_measures_to_endpoint() {
        let d = line_to_point_dist(&[3.0, 4.0], &[0.0, 0.0], &[0.0, 0.0]);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn higher_dimensional_remainder() {
        // Chord along the first axis; the remainder is (0, 3, 4).
        let d = line_to_point_dist(&[7.0, 3.0, 4.0], &[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_perpendicular_not_vertical() {
        // Line y = x; point (0, 2) sits sqrt(2) away.
        let d = line_to_point_dist(&[0.0, 2.0], &[0.0, 0.0], &[1.0, 1.0]);
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
    }
}
