//! Small numeric helpers: decimal rounding and NaN-skipping moments.

/// Round to `places` decimals, ties to even on the scaled value.
///
/// NaN and infinities pass through unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

/// Arithmetic mean of the non-NaN values. NaN when there are none.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Population standard deviation (divide by N) of the non-NaN values.
///
/// Two-pass: mean first, then squared deviations. NaN when there are no values.
pub fn nan_population_std(values: &[f64]) -> f64 {
    let mean = nan_mean(values.iter().copied());
    if mean.is_nan() {
        return f64::NAN;
    }
    let (sq, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_usize), |(s, n), &v| (s + (v - mean).powi(2), n + 1));
    (sq / n as f64).sqrt()
}

/// Converts a NaN result into "undefined".
pub fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}
