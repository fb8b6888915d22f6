/*!
# `Raster Ingest` - PackBits
*/



#[must_use]
/// # Decode PackBits.
///
/// A non-negative header `n` copies the next `n + 1` bytes verbatim; a
/// negative one repeats the next byte `1 - n` times; `-128` does nothing.
/// Decoding stops once `limit` bytes have been produced or the source runs
/// out.
pub(crate) fn decode(src: &[u8], limit: usize) -> Vec<u8> {
	let mut out = Vec::with_capacity(limit);
	let mut iter = src.iter().copied();

	while out.len() < limit {
		let Some(head) = iter.next() else { break; };
		let n = i8::from_ne_bytes([head]);
		match n {
			0..=i8::MAX => {
				let len = usize::from(head) + 1;
				out.extend(iter.by_ref().take(len));
			},
			-127..=-1 => {
				let Some(b) = iter.next() else { break; };
				let len = usize::from(n.unsigned_abs()) + 1;
				out.resize(out.len() + len, b);
			},
			i8::MIN => {},
		}
	}

	out.truncate(limit);
	out
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_decode() {
		// The example from Apple's technical note.
		let src = [
			0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00,
			0x2A, 0x22, 0xF7, 0xAA,
		];
		let expected = [
			0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80,
			0x00, 0x2A, 0x22, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
			0xAA, 0xAA,
		];
		assert_eq!(decode(&src, 1000), expected);
	}

	#[test]
	fn t_noop_and_limit() {
		// -128 is skipped entirely.
		assert_eq!(decode(&[0x80, 0x00, 0x05], 10), [5]);

		// Output stops at the limit even mid-run.
		assert_eq!(decode(&[0xF9, 0x01], 3), [1, 1, 1]);

		// Truncated literal runs keep what they have.
		assert_eq!(decode(&[0x03, 0x01, 0x02], 10), [1, 2]);
	}
}
