use std::path::Path;

use anyhow::{Context, Result, bail};
use image::DynamicImage;
use nifti::{NiftiObject, NiftiVolume, RandomAccessNiftiVolume, ReaderOptions};

use super::model::{Geometry, RasterMask, Volume};

// ---------------------------------------------------------------------------
// Volumetric input
// ---------------------------------------------------------------------------

/// Source of volumetric images and masks.
///
/// The batch runner only sees this trait, so tests can serve volumes from
/// memory while the application reads NIfTI files.
pub trait VolumeReader: Send + Sync {
    fn read_volume(&self, path: &Path) -> Result<Volume<f64>>;
}

/// Reads `.nii` and `.nii.gz` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiReader;

impl VolumeReader for NiftiReader {
    fn read_volume(&self, path: &Path) -> Result<Volume<f64>> {
        let obj = ReaderOptions::new()
            .read_file(path)
            .with_context(|| format!("reading NIfTI file {}", path.display()))?;
        let header = obj.header();
        let volume = obj.volume();

        let dim = volume.dim();
        if dim.is_empty() || dim.len() > 4 || (dim.len() == 4 && dim[3] > 1) {
            bail!("{}: unsupported volume dimensions {dim:?}", path.display());
        }
        let extent = |axis: usize| dim.get(axis).map(|&d| d as usize).unwrap_or(1);
        let dims = [extent(0), extent(1), extent(2)];

        let mut data = Vec::with_capacity(dims.iter().product());
        let mut coords = vec![0u16; dim.len()];
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    for (slot, v) in coords.iter_mut().zip([x, y, z]) {
                        *slot = v as u16;
                    }
                    data.push(
                        volume
                            .get_f64(&coords)
                            .with_context(|| format!("voxel ({x}, {y}, {z})"))?,
                    );
                }
            }
        }

        let spacing = |axis: usize| {
            let s = header.pixdim[axis + 1] as f64;
            if s > 0.0 { s } else { 1.0 }
        };
        // NIfTI stores RAS coordinates; the pipeline works in LPS.
        let origin = if header.sform_code > 0 {
            [
                -(header.srow_x[3] as f64),
                -(header.srow_y[3] as f64),
                header.srow_z[3] as f64,
            ]
        } else {
            [
                -(header.quatern_x as f64),
                -(header.quatern_y as f64),
                header.quatern_z as f64,
            ]
        };

        Ok(Volume::new(
            dims,
            data,
            Geometry {
                spacing: [spacing(0), spacing(1), spacing(2)],
                origin,
                ..Geometry::default()
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Raster input
// ---------------------------------------------------------------------------

/// Load a raster image as 8-bit luminance on a unit-spaced planar grid.
pub fn load_raster_image(path: &Path) -> Result<Volume<f64>> {
    let img = image::open(path).with_context(|| format!("opening image {}", path.display()))?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    let data = gray.into_raw().into_iter().map(f64::from).collect();
    Ok(Volume::new([w as usize, h as usize, 1], data, Geometry::default()))
}

/// Load a raster mask, keeping single-channel masks single-channel.
pub fn load_raster_mask(path: &Path) -> Result<RasterMask> {
    let img = image::open(path).with_context(|| format!("opening mask {}", path.display()))?;
    Ok(raster_mask_from_image(img))
}

/// Split a decoded image into the single-channel or RGB mask representation.
pub fn raster_mask_from_image(img: DynamicImage) -> RasterMask {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_) => RasterMask::Gray {
            width,
            height,
            values: img.to_luma8().into_raw(),
        },
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            let wide = img.to_luma16().into_raw();
            // 16-bit binary masks keep their 0/1 values; anything else is scaled down.
            let values = if wide.iter().all(|&v| v <= 1) {
                wide.into_iter().map(|v| v as u8).collect()
            } else {
                img.to_luma8().into_raw()
            };
            RasterMask::Gray {
                width,
                height,
                values,
            }
        }
        other => RasterMask::Rgb {
            width,
            height,
            pixels: other.to_rgb8().pixels().map(|p| p.0).collect(),
        },
    }
}
