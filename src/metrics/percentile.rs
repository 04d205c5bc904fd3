/// Linear interpolation between closest ranks over an ascending slice.
///
/// The rank of percentile `p` is `p / 100 * (n - 1)`; the result interpolates
/// between the two samples around that rank. `p` is clamped to `0..=100`.
/// Returns `None` for an empty slice or a NaN `p`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "Percentile interpolation is inherently floating point"
)]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || p.is_nan() {
        return None;
    }
    let last = sorted.len().saturating_sub(1);
    let p = p.clamp(0.0, 100.0);
    #[expect(
        clippy::cast_precision_loss,
        reason = "Sample counts stay far below 2^52"
    )]
    let rank = p / 100.0 * last as f64;
    let lower = rank.floor();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rank is within 0..=last"
    )]
    let lower_idx = (lower as usize).min(last);
    let upper_idx = lower_idx.saturating_add(1).min(last);
    let low = *sorted.get(lower_idx)?;
    let high = *sorted.get(upper_idx)?;
    Some(low + (high - low) * (rank - lower))
}
