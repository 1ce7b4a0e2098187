//! Decoded raster images.

/// An image decoded to RGBA, four bytes per pixel in row-major order.
#[derive(Clone)]
pub struct LoadedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl LoadedImage {
    /// Wrap decoded pixels. `rgba` must hold `width * height * 4` bytes;
    /// missing pixels read as absent.
    #[must_use]
    pub const fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Natural width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Natural size in layout units.
    #[must_use]
    pub fn dimensions_px(&self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// The raw pixel bytes.
    #[must_use]
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba
    }

    /// One pixel as `[r, g, b, a]`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = ((u64::from(y) * u64::from(self.width) + u64::from(x)) * 4) as usize;
        let bytes = self.rgba.get(index..index + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// The source pixel shown at `(x, y)` when the image is stretched to
    /// `width` x `height`, by nearest-neighbour sampling.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32, width: u32, height: u32) -> Option<[u8; 4]> {
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return None;
        }
        let sx = (u64::from(x) * u64::from(self.width) / u64::from(width))
            .min(u64::from(self.width) - 1);
        let sy = (u64::from(y) * u64::from(self.height) / u64::from(height))
            .min(u64::from(self.height) - 1);
        self.pixel(sx as u32, sy as u32)
    }
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Red, green / blue, white.
    fn checker() -> LoadedImage {
        LoadedImage::new(
            2,
            2,
            vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 0,
            ],
        )
    }

    #[test]
    fn test_pixel_bounds() {
        let image = checker();
        assert_eq!(image.pixel(1, 1), Some([255, 255, 255, 0]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(LoadedImage::new(2, 2, vec![0; 8]).pixel(0, 1), None);
    }

    #[test]
    fn test_sample_stretches_and_shrinks() {
        let image = checker();
        assert_eq!(image.sample(3, 0, 4, 4), Some([0, 255, 0, 255]));
        assert_eq!(image.sample(0, 3, 4, 4), Some([0, 0, 255, 255]));
        assert_eq!(image.sample(0, 0, 1, 1), Some([255, 0, 0, 255]));
        assert_eq!(image.sample(0, 0, 0, 4), None);
    }

    #[test]
    fn test_dimensions_px() {
        assert_eq!(checker().dimensions_px(), (2, 2));
    }
}
