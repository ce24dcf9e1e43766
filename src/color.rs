use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Region colour palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct, never-black RGB colours using evenly
/// spaced hues. Suitable for painting multi-region raster masks.
pub fn region_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_are_distinct_and_not_background() {
        let colors = region_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            assert_ne!(*a, [0, 0, 0]);
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
