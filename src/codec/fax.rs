/*!
# `Raster Ingest` - CCITT Fax

The bit-level work is left to the `fax` crate; this module just adapts its
transition lists to and from packed bilevel rows.

Group 4 goes through the crate's decoder as-is. One-dimensional Group 3 and
Modified Huffman rows are read here with the crate's code tables, since TIFF
strips rarely end with an RTC and Modified Huffman has no EOLs at all.
*/

use crate::{
	codec::row_bytes,
	IngestError,
};
use fax::{
	BitReader,
	ByteReader,
	Color,
	decoder::{
		decode_g4,
		pels,
	},
	encoder::Encoder,
	maps::{
		black,
		white,
	},
	VecWriter,
};
use std::convert::Infallible;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Fax Scheme.
pub(crate) enum Scheme {
	/// # Modified Huffman (TIFF Compression 2).
	Rle,
	/// # Group 3, One-Dimensional.
	G3,
	/// # Group 3, Two-Dimensional.
	G3TwoD,
	/// # Group 4.
	G4,
}

impl Scheme {
	#[must_use]
	/// # K Parameter.
	///
	/// The value a consumer passes to its own fax decoder.
	pub(crate) const fn k(self) -> i32 {
		match self {
			Self::Rle | Self::G3 => 0,
			Self::G3TwoD => 1,
			Self::G4 => -1,
		}
	}

	#[must_use]
	/// # Byte-Aligned Rows?
	pub(crate) const fn byte_align(self) -> bool { matches!(self, Self::Rle) }
}



/// # Reverse Bits.
///
/// Convert `FillOrder=2` (LSB-first) data to the usual MSB-first layout.
pub(crate) fn reverse_bits(buf: &mut [u8]) {
	for b in buf { *b = b.reverse_bits(); }
}

/// # Decode.
///
/// Decode a fax strip into exactly `rows` packed rows where a set bit means
/// black. Missing trailing rows are left white.
///
/// ## Errors
///
/// Returns a fax error if the stream cannot be decoded, holds no rows at
/// all, or is two-dimensional Group 3 (which is not supported).
pub(crate) fn decode(src: &[u8], width: u16, rows: usize, scheme: Scheme)
-> Result<Vec<u8>, IngestError> {
	let stride = row_bytes(usize::from(width), 1)?;
	let mut out = vec![0_u8; stride.checked_mul(rows).ok_or(IngestError::Overflow)?];
	if stride == 0 { return Ok(out); }

	match scheme {
		Scheme::G4 => {
			let mut chunks = out.chunks_exact_mut(stride);
			let res = decode_g4(src.iter().copied(), width, u16::try_from(rows).ok(), |line| {
				if let Some(row) = chunks.next() { paint(row, line, width); }
			});
			if res.is_none() { return Err(IngestError::Fax); }
		},
		Scheme::Rle | Scheme::G3 => {
			decode_1d(src, width, scheme == Scheme::Rle, &mut out, stride)?;
		},
		Scheme::G3TwoD => return Err(IngestError::Fax),
	}

	Ok(out)
}

/// # Decode (One-Dimensional).
///
/// Group 3 rows may be preceded by an EOL (with or without fill bits);
/// Modified Huffman rows have no EOLs but each starts on a byte boundary.
/// Decoding stops after the last row, at an RTC, or when the data runs out.
fn decode_1d(src: &[u8], width: u16, aligned: bool, out: &mut [u8], stride: usize)
-> Result<(), IngestError> {
	// The trailing zeroes let the final codes be peeked in full.
	let iter = src.iter().copied().chain([0, 0]).map(Ok::<u8, Infallible>);
	let mut reader = match ByteReader::new(iter) {
		Ok(r) => r,
		Err(e) => match e {},
	};

	let mut line = Vec::new();
	let mut done = 0;
	for row in out.chunks_exact_mut(stride) {
		if aligned {
			let bits = reader.bits_to_byte_boundary();
			skip(&mut reader, bits);
		}
		// The first row might not have an EOL; later ones skip any stray
		// bits up to theirs.
		else if (done != 0 || reader.peek(9) == Some(0)) && ! sync_eol(&mut reader) {
			break;
		}

		// Nine zeroes can't start a row, so this is the RTC or the end.
		if matches!(reader.peek(9), None | Some(0)) { break; }

		read_line(&mut reader, width, &mut line).ok_or(IngestError::Fax)?;
		paint(row, &line, width);
		done += 1;
	}

	if done == 0 && ! out.is_empty() { Err(IngestError::Fax) }
	else { Ok(()) }
}

/// # Read Line.
///
/// Read alternating white/black runs until the row is full, collecting the
/// color change positions.
fn read_line<R: BitReader>(reader: &mut R, width: u16, line: &mut Vec<u16>)
-> Option<()> {
	line.clear();
	let mut a0: u16 = 0;
	let mut color = Color::White;
	while a0 < width {
		// Makeup codes (64+) are followed by a terminating code.
		let mut run: u16 = 0;
		loop {
			let n = match color {
				Color::White => white::decode(reader),
				Color::Black => black::decode(reader),
			}?;
			run = run.checked_add(n)?;
			if n < 64 { break; }
		}

		a0 = a0.checked_add(run)?.min(width);
		line.push(a0);
		color = ! color;
	}

	Some(())
}

/// # Sync EOL.
///
/// Skip past the next EOL (eleven or more zeroes and a one). Returns `false`
/// if the data runs out first.
fn sync_eol<R: BitReader<Error=Infallible>>(reader: &mut R) -> bool {
	let mut zeroes: u8 = 0;
	loop {
		match reader.peek(1) {
			Some(0) => { zeroes = zeroes.saturating_add(1); },
			Some(_) if 11 <= zeroes => {
				skip(reader, 1);
				return true;
			},
			Some(_) => { zeroes = 0; },
			None => return false,
		}
		skip(reader, 1);
	}
}

/// # Skip Bits.
fn skip<R: BitReader<Error=Infallible>>(reader: &mut R, bits: u8) {
	match reader.consume(bits) {
		Ok(()) => {},
		Err(e) => match e {},
	}
}

/// # Paint Row.
///
/// Set the black bits of a packed row from a transition list.
fn paint(row: &mut [u8], line: &[u16], width: u16) {
	for (x, c) in pels(line, width).enumerate() {
		if c == Color::Black { row[x >> 3] |= 0b1000_0000 >> (x & 7); }
	}
}

/// # Encode (Group 4).
///
/// Re-encode packed bilevel rows (set bit = black) as a single G4 stream.
///
/// ## Errors
///
/// Returns a fax error if the encoder fails.
pub(crate) fn encode_g4(packed: &[u8], width: u16, rows: usize)
-> Result<Vec<u8>, IngestError> {
	let stride = row_bytes(usize::from(width), 1)?;
	let mut enc = Encoder::new(VecWriter::new());
	for row in packed.chunks_exact(stride).take(rows) {
		let line = (0..usize::from(width)).map(|x|
			if 0 == row[x >> 3] & (0b1000_0000 >> (x & 7)) { Color::White }
			else { Color::Black }
		);
		enc.encode_line(line, width).map_err(|_| IngestError::Fax)?;
	}

	enc.finish()
		.map(VecWriter::finish)
		.map_err(|_| IngestError::Fax)
}
