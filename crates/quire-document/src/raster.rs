//! Software rasterizer for headless rendering.
//!
//! Paints a laid-out document into an RGBA pixel buffer, using fontdue for
//! glyphs and the decoded images of the document.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use image::{Rgba, RgbaImage};
use quire_cells::{Color, FontSpec, Rect, Surface};
use quire_common::image::LoadedImage;

use crate::images::ImageStore;
use crate::metrics::{FontSet, line_metrics};

/// A [`Surface`] backed by an in-memory image.
pub struct Rasterizer {
    width: u32,
    height: u32,
    buffer: RgbaImage,
    fonts: Arc<FontSet>,
    images: HashMap<String, LoadedImage>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fonts", &self.fonts)
            .field("images", &self.images.len())
            .finish_non_exhaustive()
    }
}

impl Rasterizer {
    /// A white canvas of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32, fonts: Arc<FontSet>) -> Self {
        Self {
            width,
            height,
            buffer: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            fonts,
            images: HashMap::new(),
        }
    }

    /// Make the images of a document available to [`Surface::draw_image`].
    #[must_use]
    pub fn with_images(mut self, store: &ImageStore) -> Self {
        self.images.clone_from(store.as_map());
        self
    }

    /// Canvas size in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Colour of one pixel, `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height).then(|| {
            let Rgba([r, g, b, _]) = *self.buffer.get_pixel(x, y);
            Color::rgb(r, g, b)
        })
    }

    /// The rendered pixels.
    #[must_use]
    pub const fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Save the rendered image to a file. The format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be saved to the given path.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.buffer.save(path).map_err(|e| {
            anyhow::anyhow!("failed to save rendering to '{}': {e}", path.display())
        })?;
        Ok(())
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.buffer.put_pixel(x as u32, y as u32, color);
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba<u8>, alpha: u8) {
        if alpha == 0 || !self.in_bounds(x, y) {
            return;
        }
        let bg = *self.buffer.get_pixel(x as u32, y as u32);
        self.buffer
            .put_pixel(x as u32, y as u32, alpha_blend(color, bg, alpha));
    }
}

const fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

impl Surface for Rasterizer {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let color = rgba(color);
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width as i32);
        let y1 = rect.bottom().min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.buffer.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        let color = rgba(color);
        // Bresenham; the renderer only asks for horizontal and vertical
        // lines but diagonals cost nothing extra.
        let (dx, dy) = ((x2 - x1).abs(), -(y2 - y1).abs());
        let (sx, sy) = (if x1 < x2 { 1 } else { -1 }, if y1 < y2 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x1, y1, dx + dy);
        loop {
            self.put(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &FontSpec, color: Color) {
        let fonts = Arc::clone(&self.fonts);
        let Some(face) = fonts.select(font) else {
            return;
        };
        let color = rgba(color);
        let (line_height, descent) = line_metrics(Some(face), font.size);
        let baseline = y + line_height - descent;
        let mut cursor_x = x as f32;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = face.rasterize(ch, font.size);
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - metrics.ymin - metrics.height as i32;
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    self.blend(glyph_x + gx as i32, glyph_y + gy as i32, color, alpha);
                }
            }
            cursor_x += metrics.advance_width;
        }
    }

    /// Nearest-neighbour scaling of the source image onto `rect`.
    fn draw_image(&mut self, rect: Rect, src: &str) {
        let Some(image) = self.images.get(src) else {
            return;
        };
        if rect.width <= 0 || rect.height <= 0 {
            return;
        }
        let (dest_w, dest_h) = (rect.width as u32, rect.height as u32);
        // Only the visible part of the destination is sampled.
        let x0 = (-rect.x).max(0) as u32;
        let y0 = (-rect.y).max(0) as u32;
        let x1 = dest_w.min((self.width as i32 - rect.x).max(0) as u32);
        let y1 = dest_h.min((self.height as i32 - rect.y).max(0) as u32);
        let mut pixels = Vec::new();
        for dy in y0..y1 {
            for dx in x0..x1 {
                if let Some([r, g, b, a]) = image.sample(dx, dy, dest_w, dest_h) {
                    pixels.push((dx, dy, Rgba([r, g, b, 255]), a));
                }
            }
        }
        for (dx, dy, color, alpha) in pixels {
            self.blend(rect.x + dx as i32, rect.y + dy as i32, color, alpha);
        }
    }
}

/// Alpha blend a foreground color onto a background color.
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Rasterizer {
        Rasterizer::new(10, 10, Arc::new(FontSet::default()))
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut raster = canvas();
        raster.fill_rect(Rect::new(-5, 8, 20, 20), Color::BLACK);
        assert_eq!(raster.pixel(0, 9), Some(Color::BLACK));
        assert_eq!(raster.pixel(9, 8), Some(Color::BLACK));
        assert_eq!(raster.pixel(0, 7), Some(Color::WHITE));
        assert_eq!(raster.pixel(10, 9), None);
    }

    #[test]
    fn test_draw_line_covers_both_ends() {
        let mut raster = canvas();
        raster.draw_line(1, 2, 6, 2, Color::LINK_BLUE);
        assert_eq!(raster.pixel(1, 2), Some(Color::LINK_BLUE));
        assert_eq!(raster.pixel(6, 2), Some(Color::LINK_BLUE));
        assert_eq!(raster.pixel(7, 2), Some(Color::WHITE));
    }

    #[test]
    fn test_draw_image_scales_nearest_neighbour() {
        let mut store = ImageStore::new();
        let mut bytes = Vec::new();
        let mut source = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        source.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        source
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let opener = crate::resource::MemoryOpener::new().with("pair.png", bytes);
        assert_eq!(store.load(&opener, "pair.png"), Some((2, 1)));

        let mut raster = canvas().with_images(&store);
        raster.draw_image(Rect::new(0, 0, 4, 2), "pair.png");
        assert_eq!(raster.pixel(0, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(raster.pixel(3, 0), Some(Color::rgb(0, 0, 255)));
        assert_eq!(raster.pixel(4, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_alpha_blend_extremes() {
        let fg = Rgba([200, 100, 50, 255]);
        let bg = Rgba([0, 0, 0, 255]);
        assert_eq!(alpha_blend(fg, bg, 255), fg);
        assert_eq!(alpha_blend(fg, bg, 0), bg);
    }
}
