//! SIMD-optimized element-wise kernels over the two price legs.
//!
//! These implementations use the `wide` crate for portable SIMD operations.
//! Inputs are truncated to the shortest slice.

use wide::f64x4;

/// Spread `a[i] - hedge[i] * b[i]`.
pub fn spread_simd(a: &[f64], b: &[f64], hedge: &[f64]) -> Vec<f64> {
    let len = a.len().min(b.len()).min(hedge.len());
    let mut result = Vec::with_capacity(len);
    let chunks = len / 4;

    for i in 0..chunks {
        let idx = i * 4;
        let va = f64x4::new([a[idx], a[idx + 1], a[idx + 2], a[idx + 3]]);
        let vb = f64x4::new([b[idx], b[idx + 1], b[idx + 2], b[idx + 3]]);
        let vh = f64x4::new([hedge[idx], hedge[idx + 1], hedge[idx + 2], hedge[idx + 3]]);
        let spread = va - vh * vb;
        result.extend_from_slice(&spread.to_array());
    }

    // Handle remaining elements
    for i in (chunks * 4)..len {
        result.push(a[i] - hedge[i] * b[i]);
    }

    result
}

/// Price ratio `a[i] / (b[i] + epsilon)`.
pub fn ratio_simd(a: &[f64], b: &[f64], epsilon: f64) -> Vec<f64> {
    let len = a.len().min(b.len());
    let mut result = Vec::with_capacity(len);
    let chunks = len / 4;
    let eps = f64x4::splat(epsilon);

    for i in 0..chunks {
        let idx = i * 4;
        let va = f64x4::new([a[idx], a[idx + 1], a[idx + 2], a[idx + 3]]);
        let vb = f64x4::new([b[idx], b[idx + 1], b[idx + 2], b[idx + 3]]);
        let ratio = va / (vb + eps);
        result.extend_from_slice(&ratio.to_array());
    }

    for i in (chunks * 4)..len {
        result.push(a[i] / (b[i] + epsilon));
    }

    result
}
