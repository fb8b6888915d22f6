/*!
# `Raster Ingest` - Kinds
*/

#[cfg(feature = "bmp")]  pub(super) mod bmp;
#[cfg(feature = "gif")]  pub(super) mod gif;
pub(super) mod image;
#[cfg(feature = "jpeg")] pub(super) mod jpeg;
#[cfg(feature = "png")]  pub(super) mod png;
#[cfg(feature = "tiff")] pub(super) mod tiff;
