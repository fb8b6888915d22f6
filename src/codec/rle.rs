/*!
# `Raster Ingest` - BMP Run-Length Encoding

Covers both `BI_RLE8` and `BI_RLE4`.
*/



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # RLE Flavor.
pub(crate) enum Rle {
	/// # Four Bits Per Pixel.
	Four,
	/// # Eight Bits Per Pixel.
	Eight,
}

impl Rle {
	/// # Expand Byte.
	///
	/// Write `count` pixels derived from `byte`: the byte itself for RLE8,
	/// or its alternating high/low nibbles for RLE4.
	fn expand(self, out: &mut [u8], q: &mut usize, count: usize, byte: u8) {
		for i in 0..count {
			let v = match self {
				Self::Eight => byte,
				Self::Four if i & 1 == 0 => byte >> 4,
				Self::Four => byte & 0x0F,
			};
			if let Some(dst) = out.get_mut(*q) { *dst = v; }
			*q += 1;
		}
	}
}

#[must_use]
/// # Decode.
///
/// Expand an RLE stream into one palette index per byte, `width * height`
/// total, in storage row order (row zero is whatever the file stores first).
/// Pixels the stream skips over (via delta or early end-of-line) stay zero.
///
/// A truncated stream simply stops; whatever was decoded is kept.
pub(crate) fn decode(src: &[u8], width: usize, height: usize, flavor: Rle) -> Vec<u8> {
	let mut out = vec![0_u8; width.saturating_mul(height)];
	let mut iter = src.iter().copied();
	let mut y: usize = 0;
	let mut q: usize = 0;

	while y < height {
		let Some(count) = iter.next() else { break; };

		// Encoded run.
		if count != 0 {
			let Some(byte) = iter.next() else { break; };
			flavor.expand(&mut out, &mut q, usize::from(count), byte);
			continue;
		}

		// Escapes.
		let Some(op) = iter.next() else { break; };
		match op {
			// End of line.
			0 => {
				y += 1;
				q = y * width;
			},
			// End of bitmap.
			1 => break,
			// Delta.
			2 => {
				let (Some(dx), Some(dy)) = (iter.next(), iter.next()) else { break; };
				y += usize::from(dy);
				q += usize::from(dy) * width + usize::from(dx);
			},
			// Absolute run.
			n => {
				let n = usize::from(n);
				let bytes = match flavor {
					Rle::Eight => n,
					Rle::Four => n.div_ceil(2),
				};
				for (i, byte) in iter.by_ref().take(bytes).enumerate() {
					match flavor {
						Rle::Eight => flavor.expand(&mut out, &mut q, 1, byte),
						Rle::Four => flavor.expand(&mut out, &mut q, (n - i * 2).min(2), byte),
					}
				}

				// Absolute runs are padded to an even byte count.
				if bytes & 1 == 1 { iter.next(); }
			},
		}
	}

	out
}
