use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use radiomics_batch::color::region_palette;

const WIDTH: u32 = 128;
const HEIGHT: u32 = 128;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A disc-shaped lesion with its own mean intensity.
struct Lesion {
    cx: f64,
    cy: f64,
    radius: f64,
    intensity: f64,
}

impl Lesion {
    fn contains(&self, x: u32, y: u32) -> bool {
        let dx = x as f64 - self.cx;
        let dy = y as f64 - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

fn random_lesions(rng: &mut SimpleRng, count: usize) -> Vec<Lesion> {
    (0..count)
        .map(|i| {
            // Spread lesions across horizontal bands so they rarely overlap.
            let band = HEIGHT as f64 / count as f64;
            Lesion {
                cx: rng.range(24.0, WIDTH as f64 - 24.0),
                cy: band * (i as f64 + 0.5),
                radius: rng.range(6.0, (band / 2.0 - 2.0).min(18.0)),
                intensity: rng.range(90.0, 220.0),
            }
        })
        .collect()
}

fn render_image(rng: &mut SimpleRng, lesions: &[Lesion]) -> GrayImage {
    GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let base = lesions
            .iter()
            .find(|l| l.contains(x, y))
            .map_or(40.0, |l| l.intensity);
        Luma([rng.gauss(base, 12.0).clamp(0.0, 255.0) as u8])
    })
}

fn render_color_mask(lesions: &[Lesion]) -> RgbImage {
    let palette = region_palette(lesions.len());
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        lesions
            .iter()
            .zip(&palette)
            .find(|(l, _)| l.contains(x, y))
            .map_or(Rgb([0, 0, 0]), |(_, c)| Rgb(*c))
    })
}

/// Single-channel 0/1 mask covering every lesion.
fn render_binary_mask(lesions: &[Lesion]) -> GrayImage {
    GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        Luma([u8::from(lesions.iter().any(|l| l.contains(x, y)))])
    })
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let root = Path::new("sample_data");
    let images = root.join("images");
    let masks = root.join("masks");
    std::fs::create_dir_all(&images).context("creating image folder")?;
    std::fs::create_dir_all(&masks).context("creating mask folder")?;

    let cases = 6;
    for case in 0..cases {
        let lesions = random_lesions(&mut rng, 1 + case % 3);
        let name = format!("case_{case:02}");

        render_image(&mut rng, &lesions)
            .save(images.join(format!("{name}.png")))
            .with_context(|| format!("writing {name}.png"))?;

        let mask_path = masks.join(format!("{name}_mask.png"));
        if case == cases - 1 {
            render_binary_mask(&lesions).save(&mask_path)?;
        } else {
            render_color_mask(&lesions).save(&mask_path)?;
        }
    }

    println!(
        "Wrote {cases} image/mask pairs ({WIDTH}x{HEIGHT}) to {}",
        root.display()
    );
    Ok(())
}
