/*!
# `Raster Ingest` - Zlib
*/

use crate::{
	ImageKind,
	IngestError,
};
use miniz_oxide::{
	deflate::compress_to_vec_zlib,
	inflate::{
		decompress_to_vec_zlib,
		TINFLStatus,
	},
};



/// # Compression Level.
const LEVEL: u8 = 6;



/// # Inflate.
///
/// Decompress a zlib stream. A stream that simply runs dry before its end
/// marker keeps whatever was recovered; anything else is corruption.
///
/// ## Errors
///
/// Returns a corruption error if the stream is not valid zlib.
pub(crate) fn inflate(src: &[u8], kind: ImageKind, ctx: &'static str)
-> Result<Vec<u8>, IngestError> {
	match decompress_to_vec_zlib(src) {
		Ok(out) => Ok(out),
		Err(e) if matches!(e.status, TINFLStatus::FailedCannotMakeProgress) && ! e.output.is_empty() => {
			log::debug!("{kind} ({ctx}): truncated zlib stream, keeping {} bytes.", e.output.len());
			Ok(e.output)
		},
		Err(_) => Err(IngestError::Corrupt(kind, ctx)),
	}
}

#[must_use]
/// # Deflate.
pub(crate) fn deflate(src: &[u8]) -> Vec<u8> { compress_to_vec_zlib(src, LEVEL) }



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_roundtrip() {
		let raw: Vec<u8> = (0..=255_u8).cycle().take(2000).collect();
		let z = deflate(&raw);
		assert_eq!(inflate(&z, ImageKind::Png, "IDAT"), Ok(raw));
	}

	#[test]
	fn t_corrupt() {
		assert_eq!(
			inflate(&[0xFF, 0xFF, 0xFF], ImageKind::Png, "IDAT"),
			Err(IngestError::Corrupt(ImageKind::Png, "IDAT")),
		);
	}
}
