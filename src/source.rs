/*!
# `Raster Ingest` - Source File
*/

use crate::{
	FLAG_BMP_NO_HEADER,
	Image,
	ImageKind,
	IngestError,
};
use std::{
	num::NonZeroUsize,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone)]
/// # Source File.
///
/// This holds the raw bytes of an image file along with its detected kind.
/// Nothing is decoded until [`Source::decode`] is called.
///
/// Files with no recognizable signature still load, since a headerless BMP
/// (DIB) has none; their kind is `None` and they can only be decoded with
/// [`FLAG_BMP_NO_HEADER`].
///
/// ## Examples
///
/// ```no_run
/// use raster_ingest::Source;
/// use std::path::Path;
///
/// let src = Source::try_from(Path::new("/path/to/image.png")).unwrap();
/// let img = src.decode(0).unwrap();
/// ```
pub struct Source {
	path: PathBuf,
	raw: Vec<u8>,
	size: NonZeroUsize,
	kind: Option<ImageKind>,
}

impl TryFrom<&Path> for Source {
	type Error = IngestError;

	fn try_from(path: &Path) -> Result<Self, Self::Error> {
		let raw = std::fs::read(path).map_err(|_| IngestError::Read)?;
		let size = NonZeroUsize::new(raw.len()).ok_or(IngestError::Unknown)?;
		let kind = ImageKind::detect(&raw);

		Ok(Self {
			path: path.to_path_buf(),
			raw,
			size,
			kind,
		})
	}
}

impl TryFrom<PathBuf> for Source {
	type Error = IngestError;

	#[inline]
	fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
		Self::try_from(path.as_path())
	}
}

/// ## Getters.
impl Source {
	#[must_use]
	/// # Kind.
	///
	/// Returns `None` if the signature wasn't recognized.
	pub const fn kind(&self) -> Option<ImageKind> { self.kind }

	#[must_use]
	/// # Path.
	pub fn path(&self) -> &Path { &self.path }

	#[must_use]
	/// # Raw Bytes.
	pub fn raw(&self) -> &[u8] { &self.raw }

	#[must_use]
	/// # File Size.
	pub const fn size(&self) -> NonZeroUsize { self.size }
}

/// ## Decoding.
impl Source {
	/// # Decode.
	///
	/// Decode the file using the detected kind, or as a headerless BMP if
	/// [`FLAG_BMP_NO_HEADER`] is set. GIFs yield their first frame and TIFFs
	/// their first page.
	///
	/// ## Errors
	///
	/// Returns [`IngestError::Unknown`] if no kind was detected (and the
	/// headerless flag is unset), [`IngestError::ImageDecode`] for
	/// recognized-but-undecodable formats, or any errors encountered while
	/// decoding.
	pub fn decode(&self, flags: u8) -> Result<Image, IngestError> {
		if 0 != flags & FLAG_BMP_NO_HEADER { ImageKind::Bmp.decode(&self.raw, flags) }
		else {
			self.kind.ok_or(IngestError::Unknown)?.decode(&self.raw, flags)
		}
	}
}
