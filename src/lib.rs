/*!
# `Raster Ingest` - Library

This library detects, parses, and normalizes BMP, GIF, PNG, and TIFF images
(with JPEG passed through) into a single canonical [`Image`] record suitable
for embedding in a document.

Depending on the source, an image's pixel buffer is either a raw bitmap
(samples packed MSB-first, rows padded to whole bytes) or a stream in one of
a handful of standard encodings (Flate, CCITT fax, DCT) that a consumer can
embed as-is. See [`Image::filter`].

## Examples

```no_run
let raw = std::fs::read("/path/to/image.bmp").unwrap();
let img = raster_ingest::decode(&raw, 0).unwrap();
assert!(img.width() > 0);
```
*/

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![allow(clippy::module_name_repetitions)]



mod codec;
mod cursor;
mod error;
mod image;
mod kind;
mod source;
mod traits;

pub use error::IngestError;
pub use image::{
	color::{
		ColorKind,
		Palette,
	},
	filter::{
		DecodeParms,
		Filter,
	},
	icc::Chromaticities,
	Image,
	mask::{
		MaskKind,
		Transparency,
	},
};
pub use kind::image::ImageKind;
pub use source::Source;

#[cfg(feature = "gif")]
pub use kind::gif::{
	decode_gif,
	GifFrames,
	GifImage,
};
#[cfg(feature = "tiff")]
pub use kind::tiff::decode_tiff;

#[cfg(feature = "bmp")]  pub(crate) use kind::bmp::ImageBmp;
#[cfg(feature = "gif")]  pub(crate) use kind::gif::ImageGif;
#[cfg(feature = "jpeg")] pub(crate) use kind::jpeg::ImageJpeg;
#[cfg(feature = "png")]  pub(crate) use kind::png::ImagePng;
#[cfg(feature = "tiff")] pub(crate) use kind::tiff::ImageTiff;



/// # Flag: Headerless BMP.
///
/// The data is a bare DIB, i.e. a BMP without its 14-byte file header. The
/// signature check is skipped and the pixels are assumed to follow the info
/// header (and palette) directly.
pub const FLAG_BMP_NO_HEADER: u8 = 0b0000_0001;

/// # Flag: Recover From Image Errors.
///
/// When a multi-strip TIFF fax image cannot be decoded, fall back to passing
/// its first strip through as-is rather than failing.
pub const FLAG_TIFF_RECOVER: u8  = 0b0000_0010;

/// # Flag: Raw Output.
///
/// Always return raw samples, never a pass-through or re-encoded stream.
/// This affects PNG, which would otherwise keep its IDAT data, and TIFF,
/// which would otherwise re-deflate or G4-encode the pixels. (JPEG data is
/// always passed through.)
pub const FLAG_RAW: u8           = 0b0000_0100;



/// # Decode.
///
/// Detect the format of the raw image data and decode it. GIFs yield their
/// first frame and TIFFs their first page.
///
/// Headerless BMP data has no signature, so when [`FLAG_BMP_NO_HEADER`] is
/// set, the data is decoded as BMP without any detection.
///
/// ## Errors
///
/// Returns an error if the format is unknown, there is no decoder for it,
/// or the image cannot be decoded.
pub fn decode(raw: &[u8], flags: u8) -> Result<Image, IngestError> {
	let kind =
		if 0 == flags & FLAG_BMP_NO_HEADER { ImageKind::try_from(raw)? }
		else { ImageKind::Bmp };
	kind.decode(raw, flags)
}
