//! PNG file output adapter.

use crate::domain::error::TrendplotError;
use crate::domain::raster::Raster;
use crate::ports::raster_port::RasterPort;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct PngAdapter;

impl PngAdapter {
    pub fn new() -> Self {
        PngAdapter
    }
}

fn encoding_error(path: &Path, e: impl std::fmt::Display) -> TrendplotError {
    TrendplotError::Encoding {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl RasterPort for PngAdapter {
    fn write(&self, raster: &Raster, path: &Path) -> Result<(), TrendplotError> {
        let expected = raster.width as usize * raster.height as usize * Raster::CHANNELS;
        if raster.pixels.len() != expected {
            return Err(encoding_error(
                path,
                format!(
                    "pixel buffer holds {} bytes, {}x{} RGB needs {}",
                    raster.pixels.len(),
                    raster.width,
                    raster.height,
                    expected
                ),
            ));
        }

        let file = File::create(path).map_err(|e| encoding_error(path, e))?;
        let mut writer = BufWriter::new(file);

        PngEncoder::new(&mut writer)
            .write_image(&raster.pixels, raster.width, raster.height, ColorType::Rgb8)
            .map_err(|e| encoding_error(path, e))?;
        writer.flush().map_err(|e| encoding_error(path, e))?;

        info!("Wrote {} OK.", path.display());
        Ok(())
    }
}
