use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};

use crate::color::Color;
use crate::screen::Framebuffer;

/// Decoded texture, stored bottom row first so `v = 0` is the bottom edge.
pub struct Texture {
    texels: Framebuffer,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img: DynamicImage =
            image::open(path).with_context(|| format!("failed to decode texture {}", path.display()))?;
        let texture = Self::from_image(&img)?;
        log::info!("loaded {}x{} texture from {}", texture.width(), texture.height(), path.display());
        Ok(texture)
    }

    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let rgba_img = img.to_rgba8();
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in (0..height).rev() {
            for x in 0..width {
                let [r, g, b, a] = rgba_img.get_pixel(x, y).0;
                texels.push(Color::from_bytes(r, g, b, a));
            }
        }
        Ok(Self { texels: Framebuffer::from_pixels(width as usize, height as usize, texels)? })
    }

    pub fn from_framebuffer(texels: Framebuffer) -> Self {
        Self { texels }
    }

    pub fn width(&self) -> usize {
        self.texels.width
    }

    pub fn height(&self) -> usize {
        self.texels.height
    }

    /// Nearest texel at `(u * width, v * height)`. Coordinates are clamped
    /// below at 0 and there is no wrap-around. `u = 1.0` (or `v = 1.0`) reads
    /// the last texel; anything further out panics through the bounds-checked
    /// [`Framebuffer::get`].
    pub fn sample(&self, u: f64, v: f64) -> Color {
        let x = clamp_texel(u * self.width() as f64, self.width());
        let y = clamp_texel(v * self.height() as f64, self.height());
        self.texels.get(x, y)
    }
}

#[inline(always)]
fn clamp_texel(coord: f64, size: usize) -> usize {
    // `as` maps NaN and negatives to 0
    let texel = coord.max(0.0) as usize;
    if coord == size as f64 { texel.saturating_sub(1) } else { texel }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker() -> Texture {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        Texture::from_image(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    #[test]
    fn rows_are_bottom_up() {
        let tex = checker();
        // image row 1 is the bottom of the picture
        assert_eq!(tex.sample(0.0, 0.0), Color::BLUE);
        assert_eq!(tex.sample(0.6, 0.0), Color::WHITE);
        assert_eq!(tex.sample(0.0, 0.6), Color::RED);
        assert_eq!(tex.sample(0.6, 0.6), Color::GREEN);
    }

    #[test]
    fn negative_uv_clamps_to_zero() {
        let tex = checker();
        assert_eq!(tex.sample(-3.0, -1.0), Color::BLUE);
        assert_eq!(tex.sample(f64::NAN, 0.0), Color::BLUE);
        assert_eq!(tex.sample(-0.5, 0.6), Color::RED);
    }

    #[test]
    fn unit_uv_reads_the_last_texel() {
        let tex = checker();
        assert_eq!(tex.sample(1.0, 1.0), Color::GREEN);
        assert_eq!(tex.sample(1.0, 0.0), Color::WHITE);
    }

    #[test]
    #[should_panic]
    fn uv_past_the_far_edge_faults() {
        checker().sample(0.0, 7.0);
    }

    #[test]
    #[should_panic]
    fn uv_just_past_one_faults() {
        checker().sample(1.01, 0.5);
    }
}
