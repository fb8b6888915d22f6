/*!
# `Raster Ingest` - PNG Chunks
*/

use crate::{
	cursor::Cursor,
	ImageKind,
	IngestError,
};



/// # Signature Length.
const SIGNATURE: usize = 8;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Image Header.
pub(super) struct Header {
	/// # Width.
	pub(super) width: usize,
	/// # Height.
	pub(super) height: usize,
	/// # Bit Depth.
	pub(super) depth: u8,
	/// # Color Type.
	pub(super) color: u8,
	/// # Interlaced (Adam7)?
	pub(super) interlaced: bool,
}

impl Header {
	/// # Parse.
	///
	/// ## Errors
	///
	/// Returns an error if the chunk is short or describes a combination of
	/// color type and bit depth that doesn't exist.
	pub(super) fn parse(data: &[u8]) -> Result<Self, IngestError> {
		let mut cur = Cursor::new(data, ImageKind::Png);
		let width = cur.u32_be("IHDR")?;
		let height = cur.u32_be("IHDR")?;
		let depth = cur.u8("IHDR")?;
		let color = cur.u8("IHDR")?;
		let compression = cur.u8("IHDR")?;
		let filter = cur.u8("IHDR")?;
		let interlace = cur.u8("IHDR")?;

		let valid = match color {
			0 => matches!(depth, 1 | 2 | 4 | 8 | 16),
			2 | 4 | 6 => matches!(depth, 8 | 16),
			3 => matches!(depth, 1 | 2 | 4 | 8),
			_ => false,
		};
		if ! valid {
			return Err(IngestError::Unsupported(ImageKind::Png, "color type/bit depth"));
		}
		if compression != 0 || filter != 0 || 1 < interlace {
			return Err(IngestError::Unsupported(ImageKind::Png, "IHDR method"));
		}

		Ok(Self {
			width: usize::try_from(width).map_err(|_| IngestError::Overflow)?,
			height: usize::try_from(height).map_err(|_| IngestError::Overflow)?,
			depth,
			color,
			interlaced: interlace == 1,
		})
	}

	#[must_use]
	/// # Channels.
	///
	/// The number of samples per pixel, including alpha.
	pub(super) const fn channels(self) -> u8 {
		match self.color {
			2 => 3,
			4 => 2,
			6 => 4,
			_ => 1,
		}
	}

	#[must_use]
	/// # Color Channels.
	///
	/// The number of samples per pixel, excluding alpha.
	pub(super) const fn color_channels(self) -> u8 {
		match self.color {
			2 | 6 => 3,
			_ => 1,
		}
	}

	#[must_use]
	/// # Has Alpha Channel?
	pub(super) const fn has_alpha(self) -> bool { matches!(self.color, 4 | 6) }

	#[must_use]
	/// # Is Indexed?
	pub(super) const fn is_indexed(self) -> bool { self.color == 3 }
}



/// # Chunks.
///
/// Iterate over the `(type, data)` pairs following the signature. CRCs are
/// skipped without verification. Iteration ends after `IEND`, or with an
/// error if the stream is truncated.
pub(super) struct Chunks<'a> {
	cur: Cursor<'a>,
	done: bool,
}

impl<'a> Chunks<'a> {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns an error if the data is too short to hold a signature.
	pub(super) fn new(raw: &'a [u8]) -> Result<Self, IngestError> {
		let mut cur = Cursor::new(raw, ImageKind::Png);
		cur.skip(SIGNATURE, "signature")?;
		Ok(Self { cur, done: false })
	}

	/// # Next Chunk.
	fn next_chunk(&mut self) -> Result<([u8; 4], &'a [u8]), IngestError> {
		let len = usize::try_from(self.cur.u32_be("chunk length")?)
			.map_err(|_| IngestError::Overflow)?;
		let kind = self.cur.take(4, "chunk type")?;
		let data = self.cur.take(len, "chunk data")?;

		// A missing CRC at the very end is harmless.
		if kind == b"IEND" { self.done = true; }
		else { self.cur.skip(4, "chunk CRC")?; }

		Ok(([kind[0], kind[1], kind[2], kind[3]], data))
	}
}

impl<'a> Iterator for Chunks<'a> {
	type Item = Result<([u8; 4], &'a [u8]), IngestError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done { return None; }
		let out = self.next_chunk();
		if out.is_err() { self.done = true; }
		Some(out)
	}
}
