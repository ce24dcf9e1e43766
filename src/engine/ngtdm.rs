use std::collections::BTreeMap;

use super::Roi;

/// Neighbouring gray-tone difference features.
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    // level → (count, Σ |level - neighbourhood mean|)
    let mut table: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for &idx in &roi.voxels {
        let level = roi.gray[idx];
        let coords = roi.image.coords(idx);
        let neighbours: Vec<u32> = roi
            .neighbours
            .iter()
            .map(|&offset| roi.gray_at(coords, offset))
            .filter(|&g| g != 0)
            .collect();
        if neighbours.is_empty() {
            continue;
        }
        let mean = neighbours.iter().map(|&g| g as f64).sum::<f64>() / neighbours.len() as f64;
        let entry = table.entry(level).or_default();
        entry.0 += 1.0;
        entry.1 += (level as f64 - mean).abs();
    }

    let nvp: f64 = table.values().map(|(n, _)| n).sum();
    if nvp == 0.0 {
        return vec![
            ("Coarseness", f64::NAN),
            ("Contrast", f64::NAN),
            ("Busyness", f64::NAN),
            ("Strength", f64::NAN),
        ];
    }
    // (level, probability, s)
    let rows: Vec<(f64, f64, f64)> = table
        .iter()
        .map(|(&level, &(n, s))| (level as f64, n / nvp, s))
        .collect();
    let ngp = rows.len() as f64;
    let sum_s: f64 = rows.iter().map(|r| r.2).sum();
    let weighted: f64 = rows.iter().map(|(_, p, s)| p * s).sum();

    let coarseness = if weighted == 0.0 { 1e6 } else { 1.0 / weighted };

    let mut spread = 0.0;
    let mut busy = 0.0;
    let mut strength = 0.0;
    for &(i, pi, _) in &rows {
        for &(j, pj, _) in &rows {
            spread += pi * pj * (i - j).powi(2);
            busy += (i * pi - j * pj).abs();
            strength += (pi + pj) * (i - j).powi(2);
        }
    }
    let contrast = if ngp > 1.0 {
        spread / (ngp * (ngp - 1.0)) * sum_s / nvp
    } else {
        0.0
    };
    let busyness = if busy == 0.0 { 0.0 } else { weighted / busy };
    let strength = if sum_s == 0.0 { 0.0 } else { strength / sum_s };

    vec![
        ("Coarseness", coarseness),
        ("Contrast", contrast),
        ("Busyness", busyness),
        ("Strength", strength),
    ]
}
