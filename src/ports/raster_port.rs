//! Image output port trait.

use std::path::Path;

use crate::domain::error::TrendplotError;
use crate::domain::raster::Raster;

pub trait RasterPort {
    /// Encode `raster` to `path`. Failures surface as
    /// [`TrendplotError::Encoding`].
    fn write(&self, raster: &Raster, path: &Path) -> Result<(), TrendplotError>;
}
