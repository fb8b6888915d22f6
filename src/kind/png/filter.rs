/*!
# `Raster Ingest` - PNG Scanline Filters
*/

use crate::{
	ImageKind,
	IngestError,
};



/// # Unfilter Row.
///
/// Reverse the filter applied to `cur` in place. `prev` is the previously
/// reconstructed row of the same pass (all zeroes for the first row), and
/// `bpp` is the number of whole bytes per pixel (at least one).
///
/// ## Errors
///
/// Returns a corruption error if the filter type is unknown.
pub(super) fn unfilter_row(filter: u8, cur: &mut [u8], prev: &[u8], bpp: usize)
-> Result<(), IngestError> {
	match filter {
		// None.
		0 => {},
		// Sub.
		1 => for i in bpp..cur.len() {
			cur[i] = cur[i].wrapping_add(cur[i - bpp]);
		},
		// Up.
		2 => for (c, &p) in cur.iter_mut().zip(prev) {
			*c = c.wrapping_add(p);
		},
		// Average.
		3 => for i in 0..cur.len() {
			let left = if i < bpp { 0 } else { u16::from(cur[i - bpp]) };
			let up = u16::from(prev[i]);
			cur[i] = cur[i].wrapping_add(((left + up) >> 1) as u8);
		},
		// Paeth.
		4 => for i in 0..cur.len() {
			let (left, upleft) =
				if i < bpp { (0, 0) }
				else { (cur[i - bpp], prev[i - bpp]) };
			cur[i] = cur[i].wrapping_add(paeth(left, prev[i], upleft));
		},
		_ => return Err(IngestError::Corrupt(ImageKind::Png, "filter type")),
	}

	Ok(())
}

/// # Paeth Predictor.
///
/// Ties go to the left, then up, then up-left.
const fn paeth(a: u8, b: u8, c: u8) -> u8 {
	let p = a as i16 + b as i16 - c as i16;
	let pa = (p - a as i16).abs();
	let pb = (p - b as i16).abs();
	let pc = (p - c as i16).abs();

	if pa <= pb && pa <= pc { a }
	else if pb <= pc { b }
	else { c }
}
