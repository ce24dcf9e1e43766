use std::collections::{BTreeMap, HashMap};

use super::{Roi, average_directions, entropy};

const NAMES: [&str; 6] = [
    "ShortRunEmphasis",
    "LongRunEmphasis",
    "GrayLevelNonUniformity",
    "RunLengthNonUniformity",
    "RunPercentage",
    "RunEntropy",
];

/// `(gray level, run length)` of every maximal run along `direction`.
fn runs(roi: &Roi, direction: [isize; 3]) -> Vec<(u32, usize)> {
    let back = direction.map(|c| -c);
    let mut found = Vec::new();
    for &idx in &roi.voxels {
        let level = roi.gray[idx];
        let mut coords = roi.image.coords(idx);
        if roi.gray_at(coords, back) == level {
            continue;
        }
        let mut length = 1;
        while let Some(next) = roi.image.offset(coords, direction) {
            if roi.gray[next] != level {
                break;
            }
            length += 1;
            coords = roi.image.coords(next);
        }
        found.push((level, length));
    }
    found
}

/// Summary statistics shared by run-length, size-zone and dependence matrices:
/// entries are `(gray level, size)` occurrences.
pub(crate) struct SizeMatrix {
    pub by_level: BTreeMap<u32, f64>,
    pub by_size: BTreeMap<usize, f64>,
    pub cells: HashMap<(u32, usize), f64>,
    pub total: f64,
}

impl SizeMatrix {
    pub fn new(entries: &[(u32, usize)]) -> Self {
        let mut by_level: BTreeMap<u32, f64> = BTreeMap::new();
        let mut by_size: BTreeMap<usize, f64> = BTreeMap::new();
        let mut cells: HashMap<(u32, usize), f64> = HashMap::new();
        for &(level, size) in entries {
            *by_level.entry(level).or_default() += 1.0;
            *by_size.entry(size).or_default() += 1.0;
            *cells.entry((level, size)).or_default() += 1.0;
        }
        Self {
            by_level,
            by_size,
            cells,
            total: entries.len() as f64,
        }
    }

    /// `Σ P(i,j) / j²` normalised by the entry count.
    pub fn small_emphasis(&self) -> f64 {
        self.by_size
            .iter()
            .map(|(&s, c)| c / (s * s) as f64)
            .sum::<f64>()
            / self.total
    }

    pub fn large_emphasis(&self) -> f64 {
        self.by_size
            .iter()
            .map(|(&s, c)| c * (s * s) as f64)
            .sum::<f64>()
            / self.total
    }

    pub fn level_non_uniformity(&self) -> f64 {
        self.by_level.values().map(|c| c * c).sum::<f64>() / self.total
    }

    pub fn size_non_uniformity(&self) -> f64 {
        self.by_size.values().map(|c| c * c).sum::<f64>() / self.total
    }

    pub fn entropy(&self) -> f64 {
        entropy(self.cells.values().map(|c| c / self.total))
    }
}

/// Gray-level run-length features averaged over directions.
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    let voxels = roi.voxels.len() as f64;
    let per_direction: Vec<Vec<f64>> = roi
        .directions
        .iter()
        .map(|&d| {
            let m = SizeMatrix::new(&runs(roi, d));
            vec![
                m.small_emphasis(),
                m.large_emphasis(),
                m.level_non_uniformity(),
                m.size_non_uniformity(),
                m.total / voxels,
                m.entropy(),
            ]
        })
        .collect();
    average_directions(&NAMES, per_direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Geometry, Volume};

    #[test]
    fn runs_break_on_level_change_and_mask_edge() {
        let image = Volume::new([5, 1, 1], vec![0.0, 0.0, 50.0, 50.0, 0.0], Geometry::default());
        let mask = Volume::new([5, 1, 1], vec![1, 1, 1, 1, 0], Geometry::default());
        let roi = Roi::new(&image, &mask, 25.0, false);
        let mut found = runs(&roi, [1, 0, 0]);
        found.sort();
        assert_eq!(found, vec![(1, 2), (3, 2)]);
    }

    #[test]
    fn single_run_percentage() {
        let image = Volume::new([4, 1, 1], vec![1.0; 4], Geometry::default());
        let mask = Volume::new([4, 1, 1], vec![1; 4], Geometry::default());
        let roi = Roi::new(&image, &mask, 25.0, false);
        let f = compute(&roi);
        assert_eq!(f[4], ("RunPercentage", 0.25));
        assert_eq!(f[1], ("LongRunEmphasis", 16.0));
    }
}
