//! Scalar statistics shared by the analyzers.
//!
//! All variance-like quantities use the population (N-denominator) form:
//! the analyzers treat every pixel of the field as the full population,
//! not a sample drawn from one.

/// Compute arithmetic mean. Returns 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

/// Compute population variance. Returns 0.0 for an empty slice.
#[must_use]
pub fn variance(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Compute population standard deviation.
#[must_use]
pub fn std_dev(values: &[f32]) -> f64 {
    variance(values).sqrt()
}

/// Pearson correlation coefficient between two equally sized value slices.
///
/// Returns `None` when either slice has zero standard deviation (a constant
/// signal carries no structure to correlate), when the slices are empty, or
/// when their lengths differ.
#[must_use]
pub fn pearson(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = f64::from(x) - mean_a;
        let dy = f64::from(y) - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
