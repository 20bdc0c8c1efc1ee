// Temporal module - Time-domain feature extraction
//
// Per-frame measurements computed directly from the time-domain signal.
// Each function returns 0.0 for an empty frame.

/// Root-mean-square amplitude of a frame
///
/// Formula: RMS = sqrt((1 / N) × Σ x[n]²)
pub fn compute_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let energy: f32 = frame.iter().map(|&x| x * x).sum();
    (energy / frame.len() as f32).sqrt()
}

/// Compute zero-crossing rate (ZCR)
///
/// Fraction of adjacent sample pairs whose sign differs. Zero counts as
/// positive, so silence has no crossings.
///
/// # Returns
/// Zero-crossing rate (0.0 to 1.0)
pub fn compute_zcr(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    crossings as f32 / (frame.len() - 1) as f32
}

/// Peak absolute amplitude of a window
pub fn compute_peak(window: &[f32]) -> f32 {
    window.iter().fold(0.0_f32, |peak, &x| peak.max(x.abs()))
}
