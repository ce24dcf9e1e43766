use std::collections::BTreeSet;

use super::model::{CANONICAL_DIRECTION, Geometry, RasterMask, RegionId, RegionMask, Volume};

// ---------------------------------------------------------------------------
// Volumetric masks: one region per non-zero label
// ---------------------------------------------------------------------------

/// Replace the orientation of a volume with the canonical direction cosines.
pub fn impose_canonical_direction<T>(volume: &mut Volume<T>) {
    volume.geometry.direction = CANONICAL_DIRECTION;
}

/// Convert voxel values to integer labels.
///
/// Values are truncated toward zero, so 1.2 and 1.7 both become label 1 and
/// anything in (-1, 1) is background.
pub fn to_labels(volume: &Volume<f64>) -> Volume<i64> {
    volume.map(|v| v as i64)
}

/// Distinct non-zero labels, ascending.
fn distinct_labels(mask: &Volume<i64>) -> BTreeSet<i64> {
    mask.data.iter().copied().filter(|&v| v != 0).collect()
}

/// Binary mask of the voxels equal to `label`, on the source mask's grid.
fn label_region(mask: &Volume<i64>, label: i64) -> RegionMask {
    RegionMask {
        id: RegionId::Label(label),
        mask: mask.map(|v| u8::from(v == label)),
    }
}

/// Split a label volume into one binary region per non-zero label.
pub fn decompose_labels(mask: &Volume<i64>) -> Vec<RegionMask> {
    distinct_labels(mask)
        .into_iter()
        .map(|label| label_region(mask, label))
        .collect()
}

// ---------------------------------------------------------------------------
// Raster masks: one region per non-black colour
// ---------------------------------------------------------------------------

/// Normalised three-channel raster mask.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMask {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 3]>,
}

/// Bring a raster mask to three channels.
///
/// Single-channel masks are replicated across channels; when their values are
/// restricted to {0, 1} they are rescaled to {0, 255} first.
pub fn normalize_raster_mask(mask: RasterMask) -> ColorMask {
    match mask {
        RasterMask::Rgb {
            width,
            height,
            pixels,
        } => ColorMask {
            width,
            height,
            pixels,
        },
        RasterMask::Gray {
            width,
            height,
            values,
        } => {
            let binary = values.iter().all(|&v| v <= 1);
            let pixels = values
                .into_iter()
                .map(|v| {
                    let v = if binary { v * 255 } else { v };
                    [v, v, v]
                })
                .collect();
            ColorMask {
                width,
                height,
                pixels,
            }
        }
    }
}

/// Distinct non-black colours, in ascending channel order.
pub fn distinct_colors(mask: &ColorMask) -> BTreeSet<[u8; 3]> {
    mask.pixels
        .iter()
        .copied()
        .filter(|&c| c != [0, 0, 0])
        .collect()
}

/// Binary mask of the pixels matching `color` on every channel.
pub fn color_region(mask: &ColorMask, color: [u8; 3]) -> RegionMask {
    let data = mask.pixels.iter().map(|&p| u8::from(p == color)).collect();
    RegionMask {
        id: RegionId::Color(color),
        mask: Volume::new([mask.width, mask.height, 1], data, Geometry::default()),
    }
}

/// Split a raster mask into one region per colour, dropping empty regions.
pub fn decompose_colors(mask: &ColorMask) -> Vec<RegionMask> {
    distinct_colors(mask)
        .into_iter()
        .map(|color| color_region(mask, color))
        .filter(|region| !region.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_volume(values: Vec<i64>) -> Volume<i64> {
        let geometry = Geometry {
            spacing: [0.5, 0.5, 2.0],
            origin: [10.0, -4.0, 3.0],
            direction: CANONICAL_DIRECTION,
        };
        Volume::new([values.len(), 1, 1], values, geometry)
    }

    #[test]
    fn fractional_mask_values_truncate_to_one_label() {
        let mask = Volume::new(
            [5, 1, 1],
            vec![1.2, 1.7, 0.9, -0.5, 2.0],
            Geometry::default(),
        );
        let labels = to_labels(&mask);
        assert_eq!(labels.data, vec![1, 1, 0, 0, 2]);

        let regions = decompose_labels(&labels);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, RegionId::Label(1));
        assert_eq!(regions[0].mask.data, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn three_labels_give_three_regions_without_background() {
        let mask = label_volume(vec![0, 1, 2, 5, 5, 0, 1]);
        let regions = decompose_labels(&mask);

        let ids: Vec<RegionId> = regions.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            [RegionId::Label(1), RegionId::Label(2), RegionId::Label(5)]
        );
        assert_eq!(regions[2].mask.data, vec![0, 0, 0, 1, 1, 0, 0]);
    }

    #[test]
    fn regions_inherit_source_geometry() {
        let mask = label_volume(vec![3, 0, 3]);
        let region = label_region(&mask, 3);
        assert_eq!(region.mask.geometry, mask.geometry);
        assert_eq!(region.mask.dims, mask.dims);
        assert!(region.mask.data.iter().all(|&v| v <= 1));
    }

    #[test]
    fn canonical_direction_replaces_orientation() {
        let mut vol = Volume::new([1, 1, 1], vec![0.0], Geometry::default());
        impose_canonical_direction(&mut vol);
        assert_eq!(vol.geometry.direction, CANONICAL_DIRECTION);
    }

    #[test]
    fn two_colors_give_two_regions() {
        let mask = ColorMask {
            width: 4,
            height: 1,
            pixels: vec![[0, 0, 0], [255, 0, 0], [0, 255, 0], [255, 0, 0]],
        };
        let regions = decompose_colors(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, RegionId::Color([0, 255, 0]));
        assert_eq!(regions[1].mask.data, vec![0, 1, 0, 1]);
    }

    #[test]
    fn binary_gray_masks_are_rescaled() {
        let mask = normalize_raster_mask(RasterMask::Gray {
            width: 3,
            height: 1,
            values: vec![0, 1, 1],
        });
        assert_eq!(mask.pixels, vec![[0, 0, 0], [255, 255, 255], [255, 255, 255]]);
        assert_eq!(distinct_colors(&mask).len(), 1);
    }

    #[test]
    fn multi_level_gray_masks_are_only_replicated() {
        let mask = normalize_raster_mask(RasterMask::Gray {
            width: 3,
            height: 1,
            values: vec![0, 2, 7],
        });
        assert_eq!(mask.pixels, vec![[0, 0, 0], [2, 2, 2], [7, 7, 7]]);
    }

    #[test]
    fn all_black_mask_has_no_regions() {
        let mask = ColorMask {
            width: 2,
            height: 1,
            pixels: vec![[0, 0, 0]; 2],
        };
        assert!(decompose_colors(&mask).is_empty());
    }
}
