/*!
# `Raster Ingest` - Read Cursor

Container parsers thread one of these through their functions instead of
keeping a stream position on some shared object.
*/

use crate::{
	ImageKind,
	IngestError,
};



#[derive(Debug, Clone)]
/// # Cursor.
pub(crate) struct Cursor<'a> {
	buf: &'a [u8],
	pos: usize,
	kind: ImageKind,
}

impl<'a> Cursor<'a> {
	#[inline]
	/// # New.
	pub(crate) const fn new(buf: &'a [u8], kind: ImageKind) -> Self {
		Self { buf, pos: 0, kind }
	}

	#[inline]
	/// # Position.
	pub(crate) const fn pos(&self) -> usize { self.pos }

	#[inline]
	/// # Remaining Bytes.
	pub(crate) const fn remaining(&self) -> usize { self.buf.len() - self.pos }

	#[inline]
	/// # Premature EOF.
	const fn eof(&self, ctx: &'static str) -> IngestError { IngestError::Eof(self.kind, ctx) }

	/// # Seek.
	///
	/// Jump to an absolute position (which may equal the length).
	pub(crate) fn seek(&mut self, pos: usize, ctx: &'static str) -> Result<(), IngestError> {
		if pos <= self.buf.len() {
			self.pos = pos;
			Ok(())
		}
		else { Err(self.eof(ctx)) }
	}

	/// # Skip.
	pub(crate) fn skip(&mut self, len: usize, ctx: &'static str) -> Result<(), IngestError> {
		self.take(len, ctx).map(|_| ())
	}

	/// # Take.
	///
	/// Return the next `len` bytes, advancing past them.
	pub(crate) fn take(&mut self, len: usize, ctx: &'static str)
	-> Result<&'a [u8], IngestError> {
		let buf: &'a [u8] = self.buf;
		let end = self.pos.checked_add(len).ok_or_else(|| self.eof(ctx))?;
		let out = buf.get(self.pos..end).ok_or_else(|| self.eof(ctx))?;
		self.pos = end;
		Ok(out)
	}

	/// # Take Array.
	fn array<const N: usize>(&mut self, ctx: &'static str) -> Result<[u8; N], IngestError> {
		let mut out = [0_u8; N];
		out.copy_from_slice(self.take(N, ctx)?);
		Ok(out)
	}

	/// # Byte.
	pub(crate) fn u8(&mut self, ctx: &'static str) -> Result<u8, IngestError> {
		let [b] = self.array::<1>(ctx)?;
		Ok(b)
	}

	/// # U16 (Little Endian).
	pub(crate) fn u16_le(&mut self, ctx: &'static str) -> Result<u16, IngestError> {
		self.array(ctx).map(u16::from_le_bytes)
	}

	/// # U16 (Big Endian).
	pub(crate) fn u16_be(&mut self, ctx: &'static str) -> Result<u16, IngestError> {
		self.array(ctx).map(u16::from_be_bytes)
	}

	/// # U32 (Little Endian).
	pub(crate) fn u32_le(&mut self, ctx: &'static str) -> Result<u32, IngestError> {
		self.array(ctx).map(u32::from_le_bytes)
	}

	/// # U32 (Big Endian).
	pub(crate) fn u32_be(&mut self, ctx: &'static str) -> Result<u32, IngestError> {
		self.array(ctx).map(u32::from_be_bytes)
	}

	/// # I32 (Little Endian).
	pub(crate) fn i32_le(&mut self, ctx: &'static str) -> Result<i32, IngestError> {
		self.array(ctx).map(i32::from_le_bytes)
	}
}
