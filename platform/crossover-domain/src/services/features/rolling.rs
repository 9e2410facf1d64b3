/// Trailing arithmetic mean over `window` values, `None` until the window is
/// full. Each mean is reduced from its own index range of `values`, so the
/// result for row `t` never depends on rounding carried over from earlier
/// rows.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|idx| {
            if idx + 1 < window {
                return None;
            }
            let slice = &values[idx + 1 - window..=idx];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Period-over-period percentage change; the first element is `0.0`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(0.0);
    for pair in values.windows(2) {
        out.push(pair[1] / pair[0] - 1.0);
    }
    out
}

/// Running maximum including the current element.
pub fn cumulative_max(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut peak = f64::NEG_INFINITY;
    for &value in values {
        if value > peak {
            peak = value;
        }
        out.push(peak);
    }
    out
}
