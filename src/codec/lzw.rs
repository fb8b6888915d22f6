/*!
# `Raster Ingest` - LZW

Variable-width LZW as used by GIF (LSB-first codes) and TIFF (MSB-first
codes, with the width bumped one code early).
*/

/// # Dictionary Capacity.
///
/// Codes never exceed twelve bits; once full, the table stops growing (and
/// the width stays capped) until the next clear code.
pub(crate) const MAX_ENTRIES: usize = 4096;

/// # Maximum Code Width.
const MAX_BITS: u8 = 12;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Bit Order.
pub(crate) enum BitOrder {
	/// # Least-Significant First (GIF).
	Lsb,
	/// # Most-Significant First (TIFF).
	Msb,
}



/// # Code Reader.
struct Codes<'a> {
	src: &'a [u8],
	pos: usize,
	acc: u32,
	bits: u8,
	order: BitOrder,
}

impl<'a> Codes<'a> {
	const fn new(src: &'a [u8], order: BitOrder) -> Self {
		Self { src, pos: 0, acc: 0, bits: 0, order }
	}

	/// # Next Code.
	///
	/// Returns `None` once the source runs dry.
	fn next(&mut self, width: u8) -> Option<u16> {
		while self.bits < width {
			let byte = u32::from(*self.src.get(self.pos)?);
			self.pos += 1;
			match self.order {
				BitOrder::Lsb => { self.acc |= byte << self.bits; },
				BitOrder::Msb => { self.acc = (self.acc << 8) | byte; },
			}
			self.bits += 8;
		}

		let mask = (1_u32 << width) - 1;
		let code = match self.order {
			BitOrder::Lsb => {
				let code = self.acc & mask;
				self.acc >>= width;
				code
			},
			BitOrder::Msb => (self.acc >> (self.bits - width)) & mask,
		};
		self.bits -= width;
		if self.order == BitOrder::Msb { self.acc &= (1_u32 << self.bits) - 1; }

		u16::try_from(code).ok()
	}
}



#[derive(Debug, Clone)]
/// # LZW Decoder.
///
/// The dictionary lives here for the duration of one decode call.
pub(crate) struct Lzw {
	min_bits: u8,
	order: BitOrder,
	early: bool,
	prefix: Vec<u16>,
	suffix: Vec<u8>,
	first: Vec<u8>,
	stack: Vec<u8>,
}

impl Lzw {
	#[must_use]
	/// # GIF Flavor.
	///
	/// Returns `None` if the minimum code size is out of range. Roots have to
	/// fit in a byte.
	pub(crate) fn gif(min_bits: u8) -> Option<Self> {
		(1..=8).contains(&min_bits).then(|| Self::new(min_bits, BitOrder::Lsb, false))
	}

	#[must_use]
	/// # TIFF Flavor.
	pub(crate) fn tiff() -> Self { Self::new(8, BitOrder::Msb, true) }

	/// # New.
	fn new(min_bits: u8, order: BitOrder, early: bool) -> Self {
		let mut prefix = vec![0_u16; MAX_ENTRIES];
		let mut suffix = vec![0_u8; MAX_ENTRIES];
		let mut first = vec![0_u8; MAX_ENTRIES];
		for code in 0..1_usize << min_bits {
			let b = u8::try_from(code).unwrap_or(u8::MAX);
			prefix[code] = 0;
			suffix[code] = b;
			first[code] = b;
		}

		Self {
			min_bits,
			order,
			early,
			prefix,
			suffix,
			first,
			stack: Vec::with_capacity(MAX_ENTRIES),
		}
	}

	/// # Decode.
	///
	/// Decompress `src` until an end-of-information code, the end of the
	/// data, or `limit` output bytes, whichever comes first. Codes that
	/// reference entries that do not exist yet end the stream early (the
	/// output so far is kept).
	pub(crate) fn decode(&mut self, src: &[u8], limit: usize) -> Vec<u8> {
		let clear: u16 = 1 << self.min_bits;
		let eoi: u16 = clear + 1;
		let early = u16::from(self.early);

		let mut out = Vec::with_capacity(limit);
		let mut codes = Codes::new(src, self.order);
		let mut width = self.min_bits + 1;
		let mut next: u16 = clear + 2;
		let mut prev: Option<u16> = None;

		while out.len() < limit {
			let Some(code) = codes.next(width) else { break; };

			if code == clear {
				width = self.min_bits + 1;
				next = clear + 2;
				prev = None;
				continue;
			}
			if code == eoi { break; }

			let Some(old) = prev else {
				// The first code after a reset must be a root.
				if code >= clear { break; }
				out.push(self.suffix[usize::from(code)]);
				prev = Some(code);
				continue;
			};

			// Emit the entry (or the KwKwK special case), remembering its
			// first byte for the new dictionary entry.
			let lead =
				if code < next {
					self.emit(code, clear, &mut out);
					self.first[usize::from(code)]
				}
				else if code == next {
					let lead = self.first[usize::from(old)];
					self.emit(old, clear, &mut out);
					out.push(lead);
					lead
				}
				else { break; };

			if usize::from(next) < MAX_ENTRIES {
				let idx = usize::from(next);
				self.prefix[idx] = old;
				self.suffix[idx] = lead;
				self.first[idx] = self.first[usize::from(old)];
				next += 1;

				if width < MAX_BITS && next + early >= 1 << width { width += 1; }
			}

			prev = Some(code);
		}

		out.truncate(limit);
		out
	}

	/// # Emit Entry.
	fn emit(&mut self, mut code: u16, clear: u16, out: &mut Vec<u8>) {
		self.stack.clear();
		loop {
			self.stack.push(self.suffix[usize::from(code)]);
			if code < clear { break; }
			code = self.prefix[usize::from(code)];
		}
		out.extend(self.stack.iter().rev());
	}
}
