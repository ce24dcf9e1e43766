use std::f64::consts::SQRT_2;

use crate::data::model::Volume;

/// One undecimated Haar step along `axis`: low or high band, edge replicated.
fn haar_axis(volume: &Volume<f64>, axis: usize, high: bool) -> Volume<f64> {
    let mut out = volume.clone();
    let last = volume.dims[axis] - 1;
    for (idx, slot) in out.data.iter_mut().enumerate() {
        let coords = volume.coords(idx);
        let mut step = [0isize; 3];
        step[axis] = isize::from(coords[axis] < last);
        let here = volume.data[idx];
        let next = volume
            .offset(coords, step)
            .map(|n| volume.data[n])
            .unwrap_or(here);
        *slot = if high {
            (here - next) / SQRT_2
        } else {
            (here + next) / SQRT_2
        };
    }
    out
}

/// Level-1 undecimated Haar decomposition.
///
/// Every axis with more than one voxel (x, y and, unless `force_2d`, z) is
/// split into a low (`L`) and high (`H`) band; band names list the axes in
/// x, y, z order, e.g. `LLH`.
pub(crate) fn haar_bands(image: &Volume<f64>, force_2d: bool) -> Vec<(String, Volume<f64>)> {
    let axes: Vec<usize> = (0..3)
        .filter(|&axis| image.dims[axis] > 1 && !(force_2d && axis == 2))
        .collect();

    let mut bands = vec![(String::new(), image.clone())];
    for &axis in &axes {
        bands = bands
            .into_iter()
            .flat_map(|(name, band)| {
                [
                    (format!("{name}L"), haar_axis(&band, axis, false)),
                    (format!("{name}H"), haar_axis(&band, axis, true)),
                ]
            })
            .collect();
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Geometry;

    #[test]
    fn planar_image_gives_four_bands() {
        let image = Volume::new([4, 4, 1], vec![1.0; 16], Geometry::default());
        let names: Vec<String> = haar_bands(&image, false).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["LL", "LH", "HL", "HH"]);
    }

    #[test]
    fn volume_gives_eight_bands_unless_forced_planar() {
        let image = Volume::new([2, 2, 2], vec![0.0; 8], Geometry::default());
        assert_eq!(haar_bands(&image, false).len(), 8);
        assert_eq!(haar_bands(&image, true).len(), 4);
    }

    #[test]
    fn constant_image_has_empty_high_band() {
        let image = Volume::new([3, 1, 1], vec![2.0; 3], Geometry::default());
        let bands = haar_bands(&image, false);
        let (_, high) = &bands[1];
        assert!(high.data.iter().all(|&v| v == 0.0));
        let (_, low) = &bands[0];
        assert!(low.data.iter().all(|&v| (v - 2.0 * SQRT_2).abs() < 1e-12));
    }
}
