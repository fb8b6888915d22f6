/*!
# `Raster Ingest` - Codecs

Format-independent pixel reconstruction: sample packing, LZW, RLE,
PackBits, interlacing, and the thin wrappers around the external
deflate/fax collaborators.
*/

#[cfg(feature = "tiff")] pub(crate) mod fax;
#[cfg(any(feature = "png", feature = "tiff"))] pub(crate) mod flate;
#[cfg(any(feature = "gif", feature = "png"))] pub(crate) mod interlace;
#[cfg(any(feature = "gif", feature = "tiff"))] pub(crate) mod lzw;
#[cfg(feature = "tiff")] pub(crate) mod packbits;
#[cfg(feature = "bmp")] pub(crate) mod rle;

use crate::IngestError;



/// # Row Bytes.
///
/// The number of bytes needed to hold `width` pixels of `bits` bits each,
/// rounded up to a whole byte.
///
/// ## Errors
///
/// Returns an overflow error if the math doesn't fit.
pub(crate) fn row_bytes(width: usize, bits: usize) -> Result<usize, IngestError> {
	width.checked_mul(bits)
		.and_then(|x| x.checked_add(7))
		.map(|x| x / 8)
		.ok_or(IngestError::Overflow)
}

/// # Buffer Size.
///
/// Multiply a row length by a row count, checking for overflow.
///
/// ## Errors
///
/// Returns an overflow error if the math doesn't fit.
pub(crate) fn buffer_size(row: usize, height: usize) -> Result<usize, IngestError> {
	row.checked_mul(height).ok_or(IngestError::Overflow)
}

#[must_use]
/// # Get Sample.
///
/// Read the `idx`th `bits`-wide sample from a packed, MSB-first row. Sixteen
/// bit samples are big-endian.
pub(crate) fn get_sample(row: &[u8], idx: usize, bits: u8) -> u16 {
	match bits {
		8 => row.get(idx).map_or(0, |&b| u16::from(b)),
		16 => {
			let pos = idx * 2;
			match row.get(pos..pos + 2) {
				Some(&[hi, lo]) => u16::from_be_bytes([hi, lo]),
				_ => 0,
			}
		},
		1 | 2 | 4 => {
			let bits = usize::from(bits);
			let per = 8 / bits;
			let Some(&byte) = row.get(idx / per) else { return 0; };
			let shift = 8 - bits * (idx % per + 1);
			u16::from(byte >> shift) & ((1 << bits) - 1)
		},
		_ => 0,
	}
}

/// # Put Sample.
///
/// Write the `idx`th `bits`-wide sample into a packed, MSB-first row. The
/// destination bits are assumed to start out zeroed.
pub(crate) fn put_sample(row: &mut [u8], idx: usize, bits: u8, value: u16) {
	match bits {
		8 => if let Some(b) = row.get_mut(idx) {
			*b = value.to_be_bytes()[1];
		},
		16 => {
			let pos = idx * 2;
			if let Some(dst) = row.get_mut(pos..pos + 2) {
				dst.copy_from_slice(&value.to_be_bytes());
			}
		},
		1 | 2 | 4 => {
			let bits = usize::from(bits);
			let per = 8 / bits;
			if let Some(b) = row.get_mut(idx / per) {
				let shift = 8 - bits * (idx % per + 1);
				let mask = (1_u8 << bits) - 1;
				*b |= (value.to_be_bytes()[1] & mask) << shift;
			}
		},
		_ => {},
	}
}

/// # Pack Samples.
///
/// Convert a one-sample-per-byte buffer into packed rows at the given bit
/// depth. Eight-bit data is returned as-is.
///
/// ## Errors
///
/// Returns an overflow error if the dimensions don't fit.
pub(crate) fn pack(samples: Vec<u8>, width: usize, height: usize, bits: u8)
-> Result<Vec<u8>, IngestError> {
	if bits == 8 { return Ok(samples); }

	let stride = row_bytes(width, usize::from(bits))?;
	let mut out = vec![0_u8; buffer_size(stride, height)?];
	for (src, dst) in samples.chunks_exact(width).zip(out.chunks_exact_mut(stride)) {
		for (x, &v) in src.iter().enumerate() {
			put_sample(dst, x, bits, u16::from(v));
		}
	}
	Ok(out)
}

/// # Flip Rows.
///
/// Reverse the row order of a buffer in place (for bottom-up storage).
pub(crate) fn flip_rows(buf: &mut [u8], stride: usize) {
	if stride == 0 { return; }
	let rows = buf.len() / stride;
	for y in 0..rows / 2 {
		let (top, bottom) = buf.split_at_mut((rows - 1 - y) * stride);
		top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
	}
}
