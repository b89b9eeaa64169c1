use std::f64::consts::PI;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Normal probability density at `x`.
pub fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    (1.0 / ((2.0 * PI).sqrt() * sigma)) * (-0.5 * ((x - mu) / sigma).powi(2)).exp()
}
