/// Compute the Euclidean (L2) distance between two vectors.
///
/// Uses f64 intermediate precision. Returns `f32::INFINITY` on dimension
/// mismatch.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum.sqrt() as f32
}
