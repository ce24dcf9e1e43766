use super::{Roi, average_directions, entropy};

const NAMES: [&str; 9] = [
    "Autocorrelation",
    "Contrast",
    "Correlation",
    "DifferenceAverage",
    "Id",
    "Idm",
    "JointEnergy",
    "JointEntropy",
    "MaximumProbability",
];

/// Symmetric co-occurrence counts at distance 1 along `direction`.
fn cooccurrence(roi: &Roi, direction: [isize; 3]) -> Vec<f64> {
    let ng = roi.levels as usize;
    let mut matrix = vec![0.0; ng * ng];
    for &idx in &roi.voxels {
        let i = roi.gray[idx] as usize;
        let j = roi.gray_at(roi.image.coords(idx), direction) as usize;
        if j == 0 {
            continue;
        }
        matrix[(i - 1) * ng + (j - 1)] += 1.0;
        matrix[(j - 1) * ng + (i - 1)] += 1.0;
    }
    matrix
}

fn features(p: &[f64], ng: usize) -> Vec<f64> {
    let mut px = vec![0.0; ng];
    let mut py = vec![0.0; ng];
    for i in 0..ng {
        for j in 0..ng {
            px[i] += p[i * ng + j];
            py[j] += p[i * ng + j];
        }
    }
    let level = |k: usize| (k + 1) as f64;
    let ux: f64 = px.iter().enumerate().map(|(i, v)| level(i) * v).sum();
    let uy: f64 = py.iter().enumerate().map(|(j, v)| level(j) * v).sum();
    let sx = px
        .iter()
        .enumerate()
        .map(|(i, v)| (level(i) - ux).powi(2) * v)
        .sum::<f64>()
        .sqrt();
    let sy = py
        .iter()
        .enumerate()
        .map(|(j, v)| (level(j) - uy).powi(2) * v)
        .sum::<f64>()
        .sqrt();

    let mut autocorrelation = 0.0;
    let mut contrast = 0.0;
    let mut difference_average = 0.0;
    let mut id = 0.0;
    let mut idm = 0.0;
    let mut joint_energy = 0.0;
    let mut maximum: f64 = 0.0;
    for i in 0..ng {
        for j in 0..ng {
            let v = p[i * ng + j];
            let (a, b) = (level(i), level(j));
            let diff = (a - b).abs();
            autocorrelation += a * b * v;
            contrast += diff * diff * v;
            difference_average += diff * v;
            id += v / (1.0 + diff);
            idm += v / (1.0 + diff * diff);
            joint_energy += v * v;
            maximum = maximum.max(v);
        }
    }
    let correlation = if sx * sy == 0.0 {
        1.0
    } else {
        (autocorrelation - ux * uy) / (sx * sy)
    };

    vec![
        autocorrelation,
        contrast,
        correlation,
        difference_average,
        id,
        idm,
        joint_energy,
        entropy(p.iter().copied()),
        maximum,
    ]
}

/// Gray-level co-occurrence features averaged over directions.
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    let ng = roi.levels as usize;
    let per_direction: Vec<Vec<f64>> = roi
        .directions
        .iter()
        .filter_map(|&d| {
            let mut matrix = cooccurrence(roi, d);
            let total: f64 = matrix.iter().sum();
            if total == 0.0 {
                return None;
            }
            matrix.iter_mut().for_each(|v| *v /= total);
            Some(features(&matrix, ng))
        })
        .collect();
    average_directions(&NAMES, per_direction)
}
