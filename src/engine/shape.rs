use std::f64::consts::PI;

use super::Roi;

/// Count exposed faces along each axis: a face is exposed when the
/// neighbour across it is outside the region or the grid.
fn exposed_faces(roi: &Roi, axes: usize) -> [f64; 3] {
    let mut faces = [0.0; 3];
    for &idx in &roi.voxels {
        let coords = roi.image.coords(idx);
        for (axis, count) in faces.iter_mut().enumerate().take(axes) {
            for step in [-1isize, 1] {
                let mut offset = [0isize; 3];
                offset[axis] = step;
                if roi.gray_at(coords, offset) == 0 {
                    *count += 1.0;
                }
            }
        }
    }
    faces
}

/// Voxel-based 3D morphology.
pub(crate) fn compute_3d(roi: &Roi) -> Vec<(&'static str, f64)> {
    let [sx, sy, sz] = roi.image.geometry.spacing;
    let volume = roi.voxels.len() as f64 * sx * sy * sz;
    let [fx, fy, fz] = exposed_faces(roi, 3);
    let area = fx * sy * sz + fy * sx * sz + fz * sx * sy;

    vec![
        ("VoxelVolume", volume),
        ("SurfaceArea", area),
        ("SurfaceVolumeRatio", area / volume),
        ("Sphericity", (36.0 * PI * volume * volume).cbrt() / area),
    ]
}

/// Pixel-based in-plane morphology.
pub(crate) fn compute_2d(roi: &Roi) -> Vec<(&'static str, f64)> {
    let [sx, sy, _] = roi.image.geometry.spacing;
    let surface = roi.voxels.len() as f64 * sx * sy;
    let [fx, fy, _] = exposed_faces(roi, 2);
    let perimeter = fx * sy + fy * sx;

    vec![
        ("PixelSurface", surface),
        ("Perimeter", perimeter),
        ("PerimeterSurfaceRatio", perimeter / surface),
        ("Sphericity", 2.0 * (PI * surface).sqrt() / perimeter),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Geometry, Volume};

    #[test]
    fn single_voxel_cube() {
        let geometry = Geometry {
            spacing: [2.0, 2.0, 2.0],
            ..Geometry::default()
        };
        let image = Volume::new([1, 1, 1], vec![1.0], geometry);
        let mask = Volume::new([1, 1, 1], vec![1], geometry);
        let roi = Roi::new(&image, &mask, 25.0, false);
        let f = compute_3d(&roi);
        assert_eq!(f[0], ("VoxelVolume", 8.0));
        assert_eq!(f[1], ("SurfaceArea", 24.0));
    }

    #[test]
    fn square_in_plane() {
        let image = Volume::new([3, 3, 1], vec![0.0; 9], Geometry::default());
        let mut bits = vec![0u8; 9];
        for idx in [0, 1, 3, 4] {
            bits[idx] = 1;
        }
        let mask = Volume::new([3, 3, 1], bits, Geometry::default());
        let roi = Roi::new(&image, &mask, 25.0, true);
        let f = compute_2d(&roi);
        assert_eq!(f[0], ("PixelSurface", 4.0));
        assert_eq!(f[1], ("Perimeter", 8.0));
        assert_eq!(f[2], ("PerimeterSurfaceRatio", 2.0));
    }
}
