/// Compute the cosine distance between two vectors.
///
/// Returns a value in `[0, 2]`: 0 for vectors pointing the same way, 2 for
/// opposite ones. Accumulates in f64. Zero vectors and dimension
/// mismatches are maximally distant (2.0).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 2.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return 2.0;
    }

    let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    (1.0 - similarity) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_direction() {
        let d = cosine_distance(&[1.0, 2.0, 0.0], &[2.0, 4.0, 0.0]);
        assert!(d.abs() < 0.001, "scaled copy: got {d}");
    }

    #[test]
    fn test_orthogonal() {
        let d = cosine_distance(&[0.0, 1.0], &[1.0, 0.0]);
        assert!((d - 1.0).abs() < 0.001, "orthogonal: got {d}");
    }

    #[test]
    fn test_opposite() {
        let d = cosine_distance(&[0.0, 3.0], &[0.0, -1.0]);
        assert!((d - 2.0).abs() < 0.001, "opposite: got {d}");
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 1.0]), 2.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(cosine_distance(&[1.0], &[1.0, 0.0]), 2.0);
    }
}
