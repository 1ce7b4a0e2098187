//! Image loading: fetch through the resource opener, decode with the
//! `image` crate, keep the pixels for painting.
//!
//! Failures never abort a document. The builder substitutes a placeholder
//! and a warning is printed once per location.

use std::collections::HashMap;

use quire_common::image::LoadedImage;
use quire_common::warning::warn_once;

use crate::resource::ResourceOpener;

/// Decode raster bytes (PNG, JPEG, GIF, BMP) into RGBA pixels.
///
/// # Errors
///
/// Returns the decoder's error if the format is unknown or the data corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage::new(width, height, rgba.into_raw()))
}

/// Decoded images of one document, keyed by resolved location.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: HashMap<String, LoadedImage>,
}

impl ImageStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the image at `location` is loaded and return its natural
    /// size, or `None` if it cannot be opened or decoded.
    pub fn load(&mut self, opener: &dyn ResourceOpener, location: &str) -> Option<(i32, i32)> {
        if let Some(image) = self.images.get(location) {
            return Some(image.dimensions_px());
        }
        let bytes = match opener.open(location) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = warn_once("image", &format!("cannot open '{location}': {e}"));
                return None;
            }
        };
        match decode_image(&bytes) {
            Ok(image) => {
                let size = image.dimensions_px();
                log::debug!(
                    target: "quire.document",
                    "decoded '{location}' at {}x{}",
                    size.0,
                    size.1
                );
                let _ = self.images.insert(location.to_string(), image);
                Some(size)
            }
            Err(e) => {
                let _ = warn_once("image", &format!("cannot decode '{location}': {e}"));
                None
            }
        }
    }

    /// A decoded image.
    #[must_use]
    pub fn get(&self, location: &str) -> Option<&LoadedImage> {
        self.images.get(location)
    }

    /// Number of decoded images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if no image is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// All decoded images, for handing to a rasterizer.
    #[must_use]
    pub const fn as_map(&self) -> &HashMap<String, LoadedImage> {
        &self.images
    }
}
