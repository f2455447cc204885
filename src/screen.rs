use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::cast_slice;
use image::RgbaImage;

use crate::color::Color;

/// Row-major grid of colors, origin top-left in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![Color::default(); width * height] }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self> {
        anyhow::ensure!(
            pixels.len() == width * height,
            "pixel count {} does not match {}x{}",
            pixels.len(),
            width,
            height
        );
        Ok(Self { width, height, pixels })
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} framebuffer",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Panics when `(x, y)` is outside the buffer.
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Panics when `(x, y)` is outside the buffer.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Swaps row `y` with row `height - 1 - y`. The middle row of an odd
    /// height stays in place.
    pub fn flip_vertical(&mut self) {
        let width = self.width;
        if width == 0 {
            return;
        }
        let half = self.height / 2;
        let (top, bottom) = self.pixels.split_at_mut(half * width);
        let bottom_start = bottom.len() - half * width;
        let bottom = &mut bottom[bottom_start..];
        for (upper, lower) in top.chunks_exact_mut(width).zip(bottom.chunks_exact_mut(width).rev()) {
            upper.swap_with_slice(lower);
        }
    }

    /// Copy of the buffer as an RGBA image with bottom-left origin.
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let mut flipped = self.clone();
        flipped.flip_vertical();
        let words: &[u32] = cast_slice(&flipped.pixels);
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        RgbaImage::from_raw(self.width as u32, self.height as u32, bytes)
            .context("framebuffer size does not fit an RGBA image")
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Framebuffer {
        let pixels = (0..(width * height) as u32).map(Color).collect();
        Framebuffer::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn set_then_get() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set(3, 2, Color::RED);
        assert_eq!(fb.get(3, 2), Color::RED);
        assert_eq!(fb.get(0, 0), Color::default());
    }

    #[test]
    #[should_panic(expected = "outside 4x3 framebuffer")]
    fn set_out_of_bounds_faults() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set(4, 0, Color::RED);
    }

    #[test]
    #[should_panic]
    fn get_out_of_bounds_faults() {
        Framebuffer::new(4, 3).get(0, 3);
    }

    #[test]
    fn fill_overwrites_everything() {
        let mut fb = numbered(3, 3);
        fb.fill(Color::BLUE);
        assert!(fb.pixels().iter().all(|&c| c == Color::BLUE));
    }

    #[test]
    fn flip_even_height_reverses_rows() {
        let mut fb = numbered(2, 4);
        fb.flip_vertical();
        let rows: Vec<u32> = (0..4).map(|y| fb.get(0, y).0).collect();
        assert_eq!(rows, vec![6, 4, 2, 0]);
    }

    #[test]
    fn flip_odd_height_keeps_middle_row() {
        let mut fb = numbered(2, 3);
        fb.flip_vertical();
        assert_eq!(fb.get(0, 0).0, 4);
        assert_eq!(fb.get(1, 1).0, 3);
        assert_eq!(fb.get(1, 2).0, 1);
    }

    #[test]
    fn double_flip_is_identity() {
        for height in [1, 2, 5, 8] {
            let original = numbered(3, height);
            let mut fb = original.clone();
            fb.flip_vertical();
            fb.flip_vertical();
            assert_eq!(fb, original);
        }
    }

    #[test]
    fn rgba_export_is_bottom_up() {
        let mut fb = Framebuffer::new(1, 2);
        fb.set(0, 0, Color::from_bytes(1, 2, 3, 4));
        fb.set(0, 1, Color::from_bytes(5, 6, 7, 8));
        let img = fb.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [5, 6, 7, 8]);
        assert_eq!(img.get_pixel(0, 1).0, [1, 2, 3, 4]);
    }
}
