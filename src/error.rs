/*!
# `Raster Ingest` - Error
*/

use crate::ImageKind;
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// # Errors.
///
/// Every fatal condition surfaces as one of these. Variants that can point
/// at something specific carry the source format and a short context naming
/// the offending chunk, tag, or field.
pub enum IngestError {
	/// # Requested format does not match the detected signature.
	Mismatch {
		/// # Requested.
		expected: ImageKind,
		/// # Detected (if anything).
		found: Option<ImageKind>,
	},

	/// # Malformed structure.
	Corrupt(ImageKind, &'static str),

	/// # Premature end of data.
	Eof(ImageKind, &'static str),

	/// # Valid but unhandled feature.
	Unsupported(ImageKind, &'static str),

	/// # Fax strip could not be decoded.
	Fax,

	/// # GIF frame not found.
	FrameNotFound(u32),

	/// # TIFF page not found.
	PageNotFound(u32),

	/// # Decoding not supported.
	ImageDecode(ImageKind),

	/// # Image dimensions are out of range.
	Overflow,

	/// # No known signature.
	Unknown,

	/// # I/O read error.
	Read,
}

impl Error for IngestError {}

impl AsRef<str> for IngestError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for IngestError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Mismatch { expected, found: Some(found) } => write!(
				f,
				"Expected {expected} data, found {found}.",
			),
			Self::Mismatch { expected, found: None } => write!(
				f,
				"Expected {expected} data, found something unrecognizable.",
			),
			Self::Corrupt(k, ctx) | Self::Eof(k, ctx) | Self::Unsupported(k, ctx) => write!(
				f,
				"{k} ({ctx}): {}",
				self.as_str(),
			),
			Self::FrameNotFound(n) => write!(f, "GIF frame #{n} does not exist."),
			Self::PageNotFound(n) => write!(f, "TIFF page #{n} does not exist."),
			_ => f.write_str(self.as_str()),
		}
	}
}

impl IngestError {
	#[must_use]
	/// # As Str.
	///
	/// Return the error as an English string slice. Context is left out; use
	/// `Display` for the full message.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Mismatch { .. } => "The image type does not match its signature.",
			Self::Corrupt(..) => "The image is malformed.",
			Self::Eof(..) => "The image data ended prematurely.",
			Self::Unsupported(..) => "The image uses an unsupported feature.",
			Self::Fax => "The CCITT fax data could not be decoded.",
			Self::FrameNotFound(_) => "The requested GIF frame does not exist.",
			Self::PageNotFound(_) => "The requested TIFF page does not exist.",
			Self::ImageDecode(k) => match k {
				ImageKind::Jpeg2000 => "JPEG 2000 images cannot be decoded.",
				ImageKind::Jbig2 => "JBIG2 images cannot be decoded.",
				ImageKind::Wmf => "WMF images cannot be decoded.",
				_ => "Decoding support for this format was not enabled.",
			},
			Self::Overflow => "The image dimensions are out of range.",
			Self::Unknown => "The image format could not be determined.",
			Self::Read => "Unable to read the source file.",
		}
	}

	#[must_use]
	/// # Unsupported?
	///
	/// Returns `true` for structurally valid inputs using features this
	/// library deliberately does not handle.
	pub const fn is_unsupported(self) -> bool {
		matches!(self, Self::Unsupported(..) | Self::ImageDecode(_))
	}

	#[must_use]
	/// # Recoverable?
	///
	/// Returns `true` for errors the TIFF decoder can work around when
	/// [`FLAG_TIFF_RECOVER`](crate::FLAG_TIFF_RECOVER) is set.
	pub const fn is_recoverable(self) -> bool { matches!(self, Self::Fax) }
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_display() {
		let err = IngestError::Corrupt(ImageKind::Png, "IHDR");
		assert_eq!(err.to_string(), "PNG (IHDR): The image is malformed.");

		let err = IngestError::Mismatch {
			expected: ImageKind::Gif,
			found: Some(ImageKind::Png),
		};
		assert_eq!(err.to_string(), "Expected GIF data, found PNG.");

		assert_eq!(
			IngestError::FrameNotFound(3).to_string(),
			"GIF frame #3 does not exist.",
		);
	}

	#[test]
	fn t_kinds() {
		assert!(IngestError::Unsupported(ImageKind::Tiff, "tiles").is_unsupported());
		assert!(IngestError::ImageDecode(ImageKind::Wmf).is_unsupported());
		assert!(! IngestError::Fax.is_unsupported());
		assert!(IngestError::Fax.is_recoverable());
		assert!(! IngestError::Eof(ImageKind::Bmp, "palette").is_recoverable());
	}
}
