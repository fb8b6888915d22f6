/*!
# `Raster Ingest` - Image Kind
*/

use crate::{
	Image,
	IngestError,
};
use std::{
	fmt,
	io::Read,
};



/// # Magic Signatures.
///
/// Checked in order; the first match wins.
const SIGNATURES: [(&[u8], ImageKind); 10] = [
	(b"GIF", ImageKind::Gif),
	(&[0xFF, 0xD8], ImageKind::Jpeg),
	(&[0x00, 0x00, 0x00, 0x0C], ImageKind::Jpeg2000),
	(&[0xFF, 0x4F, 0xFF, 0x51], ImageKind::Jpeg2000),
	(&[0x89, b'P', b'N', b'G'], ImageKind::Png),
	(&[0xD7, 0xCD], ImageKind::Wmf),
	(b"BM", ImageKind::Bmp),
	(b"MM\x00\x2A", ImageKind::Tiff),
	(b"II\x2A\x00", ImageKind::Tiff),
	(&[0x97, b'J', b'B', b'2', 0x0D, 0x0A, 0x1A, 0x0A], ImageKind::Jbig2),
];

/// # Signature Length.
const SIG_LEN: usize = 8;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Image Kind.
pub enum ImageKind {
	/// # BMP.
	Bmp,

	/// # GIF.
	Gif,

	/// # JBIG2.
	Jbig2,

	/// # JPEG.
	Jpeg,

	/// # JPEG 2000.
	Jpeg2000,

	/// # PNG.
	Png,

	/// # TIFF.
	Tiff,

	/// # WMF.
	Wmf,
}

impl AsRef<str> for ImageKind {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for ImageKind {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TryFrom<&[u8]> for ImageKind {
	type Error = IngestError;

	/// # From Raw Bytes.
	///
	/// This is [`ImageKind::detect`], but returns an error when nothing
	/// matches.
	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		Self::detect(src).ok_or(IngestError::Unknown)
	}
}

/// ## Detection.
impl ImageKind {
	#[must_use]
	/// # Detect.
	///
	/// Examine (at most) the first eight bytes for a known magic signature.
	/// Short inputs simply fail to match the longer signatures.
	pub fn detect(src: &[u8]) -> Option<Self> {
		let head = &src[..src.len().min(SIG_LEN)];
		SIGNATURES.iter()
			.find_map(|(sig, kind)| head.starts_with(sig).then_some(*kind))
	}

	/// # Detect (Reader).
	///
	/// Pull up to eight bytes from a reader into a private buffer and detect
	/// from those. Nothing past the signature bytes is consumed.
	///
	/// ## Errors
	///
	/// This returns an error if the reader itself fails.
	pub fn detect_reader<R: Read>(src: R) -> Result<Option<Self>, IngestError> {
		let mut buf = Vec::with_capacity(SIG_LEN);
		src.take(SIG_LEN as u64).read_to_end(&mut buf)
			.map_err(|_| IngestError::Read)?;
		Ok(Self::detect(&buf))
	}

	/// # Check Signature.
	///
	/// Make sure the raw data actually looks like `self`.
	///
	/// ## Errors
	///
	/// Returns a mismatch error if it doesn't.
	pub fn check(self, src: &[u8]) -> Result<(), IngestError> {
		match Self::detect(src) {
			Some(k) if k == self => Ok(()),
			found => Err(IngestError::Mismatch { expected: self, found }),
		}
	}
}

/// ## Getters.
impl ImageKind {
	#[must_use]
	/// # As String Slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Bmp => "BMP",
			Self::Gif => "GIF",
			Self::Jbig2 => "JBIG2",
			Self::Jpeg => "JPEG",
			Self::Jpeg2000 => "JPEG 2000",
			Self::Png => "PNG",
			Self::Tiff => "TIFF",
			Self::Wmf => "WMF",
		}
	}

	#[must_use]
	/// # File Extension.
	pub const fn extension(self) -> &'static str {
		match self {
			Self::Bmp => "bmp",
			Self::Gif => "gif",
			Self::Jbig2 => "jb2",
			Self::Jpeg => "jpg",
			Self::Jpeg2000 => "jp2",
			Self::Png => "png",
			Self::Tiff => "tif",
			Self::Wmf => "wmf",
		}
	}

	#[must_use]
	/// # Media Type.
	pub const fn mime(self) -> &'static str {
		match self {
			Self::Bmp => "image/bmp",
			Self::Gif => "image/gif",
			Self::Jbig2 => "image/x-jbig2",
			Self::Jpeg => "image/jpeg",
			Self::Jpeg2000 => "image/jp2",
			Self::Png => "image/png",
			Self::Tiff => "image/tiff",
			Self::Wmf => "image/wmf",
		}
	}

	#[must_use]
	/// # Can Decode?
	///
	/// Returns `true` if decoding is supported (and enabled) for this kind.
	pub const fn can_decode(self) -> bool {
		match self {
			Self::Bmp => cfg!(feature = "bmp"),
			Self::Gif => cfg!(feature = "gif"),
			Self::Jpeg => cfg!(feature = "jpeg"),
			Self::Png => cfg!(feature = "png"),
			Self::Tiff => cfg!(feature = "tiff"),
			Self::Jbig2 | Self::Jpeg2000 | Self::Wmf => false,
		}
	}
}

/// ## Decoding.
impl ImageKind {
	/// # Decode.
	///
	/// Decode a raw image of this kind into a canonical [`Image`]. The
	/// signature is verified first (except for header-less BMPs).
	///
	/// GIFs yield their first frame and TIFFs their first page; use
	/// [`decode_gif`](crate::decode_gif) or [`decode_tiff`](crate::decode_tiff)
	/// for the rest.
	///
	/// ## Errors
	///
	/// This will bubble up any decoder errors encountered, including cases
	/// where decoding is unsupported for the format.
	pub fn decode(self, raw: &[u8], flags: u8) -> Result<Image, IngestError> {
		#[allow(unused_imports)]
		use crate::traits::Decoder;

		match self {
			#[cfg(feature = "bmp")] Self::Bmp => crate::ImageBmp::decode_checked(raw, flags),
			#[cfg(feature = "gif")] Self::Gif => crate::ImageGif::decode_checked(raw, flags),
			#[cfg(feature = "jpeg")] Self::Jpeg => crate::ImageJpeg::decode_checked(raw, flags),
			#[cfg(feature = "png")] Self::Png => crate::ImagePng::decode_checked(raw, flags),
			#[cfg(feature = "tiff")] Self::Tiff => crate::ImageTiff::decode_checked(raw, flags),
			_ => Err(IngestError::ImageDecode(self)),
		}
	}
}
