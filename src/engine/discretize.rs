/// Assign 1-based gray levels using bins of fixed width anchored at zero.
///
/// The lowest occupied bin becomes level 1, so levels are comparable between
/// regions only up to that shift.
pub(crate) fn fixed_bin_width(values: &[f64], bin_width: f64) -> Vec<u32> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let first_bin = (min / bin_width).floor();
    values
        .iter()
        .map(|&v| ((v / bin_width).floor() - first_bin) as u32 + 1)
        .collect()
}
