use std::collections::BTreeMap;

use super::{Roi, entropy};

/// Linear-interpolated percentile of sorted values, `q` in [0, 100].
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Intensity statistics of the region.
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    let mut values = roi.values();
    let n = values.len() as f64;
    values.sort_by(f64::total_cmp);

    let spacing = roi.image.geometry.spacing;
    let voxel_volume = spacing.iter().product::<f64>();

    let energy: f64 = values.iter().map(|v| v * v).sum();
    let mean = values.iter().sum::<f64>() / n;
    let central = |k: i32| values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / n;
    let m2 = central(2);
    let m3 = central(3);
    let m4 = central(4);
    let (skewness, kurtosis) = if m2 == 0.0 {
        (0.0, 0.0)
    } else {
        (m3 / m2.powf(1.5), m4 / (m2 * m2))
    };

    let mut histogram: BTreeMap<u32, f64> = BTreeMap::new();
    for &idx in &roi.voxels {
        *histogram.entry(roi.gray[idx]).or_default() += 1.0;
    }
    let probabilities: Vec<f64> = histogram.values().map(|c| c / n).collect();

    let minimum = values.first().copied().unwrap_or(f64::NAN);
    let maximum = values.last().copied().unwrap_or(f64::NAN);

    vec![
        ("Energy", energy),
        ("TotalEnergy", energy * voxel_volume),
        ("Entropy", entropy(probabilities.iter().copied())),
        ("Minimum", minimum),
        ("10Percentile", percentile(&values, 10.0)),
        ("90Percentile", percentile(&values, 90.0)),
        ("Maximum", maximum),
        ("Mean", mean),
        ("Median", percentile(&values, 50.0)),
        (
            "InterquartileRange",
            percentile(&values, 75.0) - percentile(&values, 25.0),
        ),
        ("Range", maximum - minimum),
        (
            "MeanAbsoluteDeviation",
            values.iter().map(|v| (v - mean).abs()).sum::<f64>() / n,
        ),
        ("RootMeanSquared", (energy / n).sqrt()),
        ("Variance", m2),
        ("Skewness", skewness),
        ("Kurtosis", kurtosis),
        ("Uniformity", probabilities.iter().map(|p| p * p).sum()),
    ]
}
