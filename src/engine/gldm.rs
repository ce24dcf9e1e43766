use super::Roi;
use super::glrlm::SizeMatrix;

const NAMES: [&str; 5] = [
    "SmallDependenceEmphasis",
    "LargeDependenceEmphasis",
    "GrayLevelNonUniformity",
    "DependenceNonUniformity",
    "DependenceEntropy",
];

/// Gray-level dependence features (neighbours of identical level count as dependent).
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    let entries: Vec<(u32, usize)> = roi
        .voxels
        .iter()
        .map(|&idx| {
            let level = roi.gray[idx];
            let coords = roi.image.coords(idx);
            let dependent = roi
                .neighbours
                .iter()
                .filter(|&&offset| roi.gray_at(coords, offset) == level)
                .count();
            (level, dependent + 1)
        })
        .collect();

    let m = SizeMatrix::new(&entries);
    let values = [
        m.small_emphasis(),
        m.large_emphasis(),
        m.level_non_uniformity(),
        m.size_non_uniformity(),
        m.entropy(),
    ];
    NAMES.into_iter().zip(values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Geometry, Volume};

    #[test]
    fn line_of_equal_voxels() {
        let image = Volume::new([3, 1, 1], vec![5.0; 3], Geometry::default());
        let mask = Volume::new([3, 1, 1], vec![1; 3], Geometry::default());
        let roi = Roi::new(&image, &mask, 25.0, false);
        let f = compute(&roi);
        // dependences: 2, 3, 2
        assert_eq!(f[1], ("LargeDependenceEmphasis", (4.0 + 9.0 + 4.0) / 3.0));
        assert_eq!(f[2], ("GrayLevelNonUniformity", 3.0));
    }
}
