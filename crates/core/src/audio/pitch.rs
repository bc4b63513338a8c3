//! Autocorrelation pitch and RMS intensity over a single block.
//!
//! No windowing or smoothing is applied; values are raw per block.

/// Unnormalized autocorrelation `sum(x[i] * x[i + lag])` over the overlap.
fn autocorrelation(block: &[f32], lag: usize) -> f64 {
    block
        .iter()
        .zip(&block[lag..])
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum()
}

/// Lag with the strongest autocorrelation, never 0.
///
/// The arg-max starts where the correlation first drops to or below zero, past
/// the lobe around lag 0 where neighbouring samples of any smooth signal
/// correlate most. Input whose correlation never drops (constant offsets) is
/// searched from lag 1. Ties keep the smaller lag.
pub fn dominant_lag(block: &[f32]) -> Option<usize> {
    if block.len() < 2 {
        return None;
    }

    let correlations: Vec<f64> = (1..block.len())
        .map(|lag| autocorrelation(block, lag))
        .collect();
    let search_from = correlations.iter().position(|r| *r <= 0.0).unwrap_or(0);

    let mut best_lag = search_from + 1;
    let mut best = f64::NEG_INFINITY;
    for (i, &sum) in correlations.iter().enumerate().skip(search_from) {
        if sum > best {
            best = sum;
            best_lag = i + 1;
        }
    }
    Some(best_lag)
}

/// Dominant periodicity in Hz, `sample_rate / lag`. Blocks under two samples give 0.
pub fn estimate_pitch(block: &[f32], sample_rate_hz: u32) -> f32 {
    match dominant_lag(block) {
        Some(lag) => (f64::from(sample_rate_hz) / lag as f64) as f32,
        None => 0.0,
    }
}

/// Root-mean-square level of the block. Empty blocks give 0.
pub fn estimate_intensity(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let energy: f64 = block.iter().map(|s| f64::from(*s) * f64::from(*s)).sum();
    (energy / block.len() as f64).sqrt() as f32
}
