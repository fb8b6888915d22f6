/*!
# `Raster Ingest` - Traits.
*/

use crate::{
	FLAG_BMP_NO_HEADER,
	Image,
	ImageKind,
	IngestError,
};



/// # Decoder.
///
/// This is implemented for each source format capable of producing an
/// [`Image`] from raw file bytes.
pub(super) trait Decoder {
	/// # Source Kind.
	const KIND: ImageKind;

	/// # Decode.
	///
	/// Decode the bytes from a raw image file, which are assumed to already
	/// match the format.
	///
	/// ## Errors
	///
	/// Return any errors encountered during decoding.
	fn decode(raw: &[u8], flags: u8) -> Result<Image, IngestError>;

	/// # Decode (Checked).
	///
	/// Make sure the data actually looks like the right format before
	/// decoding it. Headerless BMP data has no signature to check.
	///
	/// ## Errors
	///
	/// Returns a mismatch error if the signature is wrong, or any errors
	/// encountered during decoding.
	fn decode_checked(raw: &[u8], flags: u8) -> Result<Image, IngestError> {
		if Self::KIND != ImageKind::Bmp || 0 == flags & FLAG_BMP_NO_HEADER {
			Self::KIND.check(raw)?;
		}
		Self::decode(raw, flags)
	}
}
