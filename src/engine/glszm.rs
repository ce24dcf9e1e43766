use std::collections::VecDeque;

use super::Roi;
use super::glrlm::SizeMatrix;

const NAMES: [&str; 6] = [
    "SmallAreaEmphasis",
    "LargeAreaEmphasis",
    "GrayLevelNonUniformity",
    "SizeZoneNonUniformity",
    "ZonePercentage",
    "ZoneEntropy",
];

/// `(gray level, size)` of every connected zone of equal gray level.
fn zones(roi: &Roi) -> Vec<(u32, usize)> {
    let mut visited = vec![false; roi.gray.len()];
    let mut found = Vec::new();
    let mut queue = VecDeque::new();

    for &start in &roi.voxels {
        if visited[start] {
            continue;
        }
        let level = roi.gray[start];
        visited[start] = true;
        queue.push_back(start);
        let mut size = 0;
        while let Some(idx) = queue.pop_front() {
            size += 1;
            let coords = roi.image.coords(idx);
            for &offset in &roi.neighbours {
                if let Some(next) = roi.image.offset(coords, offset) {
                    if !visited[next] && roi.gray[next] == level {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        found.push((level, size));
    }
    found
}

/// Gray-level size-zone features.
pub(crate) fn compute(roi: &Roi) -> Vec<(&'static str, f64)> {
    let m = SizeMatrix::new(&zones(roi));
    let values = [
        m.small_emphasis(),
        m.large_emphasis(),
        m.level_non_uniformity(),
        m.size_non_uniformity(),
        m.total / roi.voxels.len() as f64,
        m.entropy(),
    ];
    NAMES.into_iter().zip(values).collect()
}
