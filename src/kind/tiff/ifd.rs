/*!
# `Raster Ingest` - TIFF Directories
*/

use crate::{
	cursor::Cursor,
	ImageKind,
	IngestError,
};
use std::collections::{
	BTreeMap,
	BTreeSet,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Byte Order.
pub(super) enum Order {
	/// # Little Endian (`II`).
	Le,
	/// # Big Endian (`MM`).
	Be,
}

impl Order {
	/// # U16.
	fn u16(self, cur: &mut Cursor, ctx: &'static str) -> Result<u16, IngestError> {
		match self {
			Self::Le => cur.u16_le(ctx),
			Self::Be => cur.u16_be(ctx),
		}
	}

	/// # U32.
	fn u32(self, cur: &mut Cursor, ctx: &'static str) -> Result<u32, IngestError> {
		match self {
			Self::Le => cur.u32_le(ctx),
			Self::Be => cur.u32_be(ctx),
		}
	}

	/// # U16 From Bytes.
	const fn read16(self, b: [u8; 2]) -> u16 {
		match self {
			Self::Le => u16::from_le_bytes(b),
			Self::Be => u16::from_be_bytes(b),
		}
	}

	/// # U32 From Bytes.
	const fn read32(self, b: [u8; 4]) -> u32 {
		match self {
			Self::Le => u32::from_le_bytes(b),
			Self::Be => u32::from_be_bytes(b),
		}
	}

	/// # I32 From Bytes.
	const fn read32i(self, b: [u8; 4]) -> i32 {
		match self {
			Self::Le => i32::from_le_bytes(b),
			Self::Be => i32::from_be_bytes(b),
		}
	}

	/// # U64 From Bytes.
	const fn read64(self, b: [u8; 8]) -> u64 {
		match self {
			Self::Le => u64::from_le_bytes(b),
			Self::Be => u64::from_be_bytes(b),
		}
	}
}



/// # Field Type Size.
///
/// Return the byte size of a single value of the given field type, or
/// `None` if the type is unknown.
const fn type_size(kind: u16) -> Option<usize> {
	match kind {
		1 | 2 | 6 | 7 => Some(1),
		3 | 8 => Some(2),
		4 | 9 | 11 | 13 => Some(4),
		5 | 10 | 12 => Some(8),
		_ => None,
	}
}



#[derive(Debug, Clone, Copy)]
/// # Field.
struct Field<'a> {
	kind: u16,
	data: &'a [u8],
}



#[derive(Debug)]
/// # Image File Directory.
///
/// The tag table of a single page, with each value resolved to the bytes
/// it occupies (inline or at its offset).
pub(super) struct Ifd<'a> {
	order: Order,
	fields: BTreeMap<u16, Field<'a>>,
}

impl<'a> Ifd<'a> {
	/// # Read.
	///
	/// Walk the directory chain to the 1-based `page` and parse its entries.
	///
	/// ## Errors
	///
	/// Returns a page-not-found error if the chain ends (or loops back on
	/// itself) before reaching the page, or an EOF/corruption error if the
	/// structures are truncated.
	pub(super) fn read(raw: &'a [u8], page: u32) -> Result<Self, IngestError> {
		let mut cur = Cursor::new(raw, ImageKind::Tiff);
		let order = match cur.take(2, "header")? {
			b"II" => Order::Le,
			b"MM" => Order::Be,
			_ => return Err(IngestError::Corrupt(ImageKind::Tiff, "byte order")),
		};
		if order.u16(&mut cur, "header")? != 42 {
			return Err(IngestError::Corrupt(ImageKind::Tiff, "header"));
		}

		let mut offset = order.u32(&mut cur, "header")?;
		if offset == 0 { return Err(IngestError::Corrupt(ImageKind::Tiff, "IFD")); }

		let mut seen = BTreeSet::new();
		let mut idx = 1;
		loop {
			if offset == 0 || ! seen.insert(offset) {
				return Err(IngestError::PageNotFound(page));
			}
			cur.seek(usize::try_from(offset).map_err(|_| IngestError::Overflow)?, "IFD")?;
			let count = usize::from(order.u16(&mut cur, "IFD")?);

			if idx == page { return Self::parse(raw, order, cur, count); }

			cur.skip(count * 12, "IFD")?;
			offset = order.u32(&mut cur, "IFD")?;
			idx += 1;
		}
	}

	/// # Parse Entries.
	fn parse(raw: &'a [u8], order: Order, mut cur: Cursor<'a>, count: usize)
	-> Result<Self, IngestError> {
		let mut fields = BTreeMap::new();
		for _ in 0..count {
			let tag = order.u16(&mut cur, "IFD entry")?;
			let kind = order.u16(&mut cur, "IFD entry")?;
			let n = usize::try_from(order.u32(&mut cur, "IFD entry")?)
				.map_err(|_| IngestError::Overflow)?;
			let inline = cur.take(4, "IFD entry")?;

			let Some(size) = type_size(kind) else {
				log::debug!("TIFF: skipping tag {tag} with unknown type {kind}.");
				continue;
			};
			let Some(len) = size.checked_mul(n) else { continue; };
			let data =
				if len <= 4 { Some(&inline[..len]) }
				else {
					usize::try_from(order.read32([inline[0], inline[1], inline[2], inline[3]]))
						.ok()
						.and_then(|off| raw.get(off..off.checked_add(len)?))
				};

			match data {
				Some(data) => { fields.insert(tag, Field { kind, data }); },
				None => { log::debug!("TIFF: skipping tag {tag} with out-of-range data."); },
			}
		}

		Ok(Self { order, fields })
	}
}

impl<'a> Ifd<'a> {
	#[must_use]
	/// # Has Tag?
	pub(super) fn has(&self, tag: u16) -> bool { self.fields.contains_key(&tag) }

	#[must_use]
	/// # Integer Values.
	///
	/// Return every value of an integer-typed field as a `u32`.
	pub(super) fn values(&self, tag: u16) -> Option<Vec<u32>> {
		let f = self.fields.get(&tag)?;
		let order = self.order;
		let out = match f.kind {
			1 | 6 | 7 => f.data.iter().map(|&b| u32::from(b)).collect(),
			3 | 8 => f.data.chunks_exact(2)
				.map(|c| u32::from(order.read16([c[0], c[1]])))
				.collect(),
			4 | 9 | 13 => f.data.chunks_exact(4)
				.map(|c| order.read32([c[0], c[1], c[2], c[3]]))
				.collect(),
			_ => return None,
		};
		Some(out)
	}

	#[must_use]
	/// # First Integer Value.
	pub(super) fn value(&self, tag: u16) -> Option<u32> {
		self.values(tag)?.first().copied()
	}

	#[must_use]
	/// # First Value as a Float.
	///
	/// This handles rationals and floats as well as plain integers.
	pub(super) fn rational(&self, tag: u16) -> Option<f64> {
		let f = self.fields.get(&tag)?;
		let order = self.order;
		match (f.kind, f.data) {
			(5, [a, b, c, d, e, g, h, i, ..]) => {
				let num = order.read32([*a, *b, *c, *d]);
				let den = order.read32([*e, *g, *h, *i]);
				if den == 0 { None } else { Some(f64::from(num) / f64::from(den)) }
			},
			(10, [a, b, c, d, e, g, h, i, ..]) => {
				let num = order.read32i([*a, *b, *c, *d]);
				let den = order.read32i([*e, *g, *h, *i]);
				if den == 0 { None } else { Some(f64::from(num) / f64::from(den)) }
			},
			(11, [a, b, c, d, ..]) => Some(f64::from(f32::from_bits(order.read32([*a, *b, *c, *d])))),
			(12, [a, b, c, d, e, g, h, i, ..]) => Some(f64::from_bits(
				order.read64([*a, *b, *c, *d, *e, *g, *h, *i])
			)),
			_ => self.value(tag).map(f64::from),
		}
	}

	#[must_use]
	/// # Raw Bytes.
	///
	/// Return the field's value bytes as-is. This is meant for opaque blobs
	/// like ICC profiles and JPEG tables.
	pub(super) fn bytes(&self, tag: u16) -> Option<&'a [u8]> {
		self.fields.get(&tag).map(|f| f.data)
	}
}



#[cfg(test)]
pub(super) mod tests {
	use super::*;

	/// # Test Value.
	pub(in crate::kind::tiff) enum V {
		Short(Vec<u16>),
		Long(Vec<u32>),
		Rational(u32, u32),
		Bytes(Vec<u8>),
	}

	/// # Build a (Little-Endian) TIFF.
	///
	/// The strips are written first, and their offsets and byte counts are
	/// added automatically unless the caller supplies their own.
	pub(in crate::kind::tiff) fn build(strips: &[&[u8]], mut tags: Vec<(u16, V)>) -> Vec<u8> {
		let mut out = b"II*\0\0\0\0\0".to_vec();
		let mut offsets = Vec::new();
		let mut counts = Vec::new();
		for s in strips {
			offsets.push(u32::try_from(out.len()).unwrap());
			counts.push(u32::try_from(s.len()).unwrap());
			out.extend_from_slice(s);
		}
		if out.len() % 2 == 1 { out.push(0); }

		if ! tags.iter().any(|(t, _)| *t == 273) { tags.push((273, V::Long(offsets))); }
		if ! tags.iter().any(|(t, _)| *t == 279) { tags.push((279, V::Long(counts))); }
		tags.sort_by_key(|(t, _)| *t);

		let ifd = out.len();
		out[4..8].copy_from_slice(&u32::try_from(ifd).unwrap().to_le_bytes());
		let mut extra_pos = ifd + 2 + 12 * tags.len() + 4;
		let mut extra = Vec::new();

		out.extend_from_slice(&u16::try_from(tags.len()).unwrap().to_le_bytes());
		for (tag, v) in tags {
			let (kind, count, bytes): (u16, usize, Vec<u8>) = match v {
				V::Short(v) => (3, v.len(), v.iter().flat_map(|n| n.to_le_bytes()).collect()),
				V::Long(v) => (4, v.len(), v.iter().flat_map(|n| n.to_le_bytes()).collect()),
				V::Rational(a, b) => (5, 1, [a.to_le_bytes(), b.to_le_bytes()].concat()),
				V::Bytes(v) => (7, v.len(), v),
			};
			out.extend_from_slice(&tag.to_le_bytes());
			out.extend_from_slice(&kind.to_le_bytes());
			out.extend_from_slice(&u32::try_from(count).unwrap().to_le_bytes());
			if bytes.len() <= 4 {
				let mut inline = [0_u8; 4];
				inline[..bytes.len()].copy_from_slice(&bytes);
				out.extend_from_slice(&inline);
			}
			else {
				out.extend_from_slice(&u32::try_from(extra_pos).unwrap().to_le_bytes());
				extra_pos += bytes.len();
				extra.extend_from_slice(&bytes);
			}
		}
		out.extend_from_slice(&[0; 4]);
		out.extend_from_slice(&extra);
		out
	}

	#[test]
	fn t_read() {
		let raw = build(&[&[1, 2, 3]], vec![
			(256, V::Short(vec![3])),
			(257, V::Long(vec![1])),
			(258, V::Short(vec![8, 8, 8])),
			(282, V::Rational(300, 2)),
			(34675, V::Bytes(vec![9; 10])),
		]);
		let ifd = Ifd::read(&raw, 1).unwrap();
		assert_eq!(ifd.value(256), Some(3));
		assert_eq!(ifd.value(257), Some(1));
		assert_eq!(ifd.values(258), Some(vec![8, 8, 8]));
		assert_eq!(ifd.values(258).map(|v| v.len()), Some(3));
		assert_eq!(ifd.rational(282), Some(150.0));
		assert_eq!(ifd.rational(256), Some(3.0));
		assert_eq!(ifd.bytes(34675), Some(&[9_u8; 10][..]));
		assert_eq!(ifd.values(273), Some(vec![8]));
		assert_eq!(ifd.values(279), Some(vec![3]));
		assert!(! ifd.has(259));

		// There is no second page.
		assert_eq!(Ifd::read(&raw, 2).unwrap_err(), IngestError::PageNotFound(2));
	}

	#[test]
	fn t_big_endian() {
		let raw = [
			b'M', b'M', 0, 42, 0, 0, 0, 8,
			// One entry: width (SHORT) = 0x0102.
			0, 1,
			1, 0, 0, 3, 0, 0, 0, 1, 1, 2, 0, 0,
			0, 0, 0, 0,
		];
		let ifd = Ifd::read(&raw, 1).unwrap();
		assert_eq!(ifd.value(256), Some(0x0102));
	}

	#[test]
	fn t_loop() {
		// A directory whose "next" pointer points back at itself.
		let mut raw = b"II*\0\x08\0\0\0".to_vec();
		raw.extend_from_slice(&[0, 0]);
		raw.extend_from_slice(&8_u32.to_le_bytes());
		assert!(Ifd::read(&raw, 1).is_ok());
		assert_eq!(Ifd::read(&raw, 2).unwrap_err(), IngestError::PageNotFound(2));
		assert_eq!(Ifd::read(&raw, 9).unwrap_err(), IngestError::PageNotFound(9));
	}

	#[test]
	fn t_truncated() {
		let raw = build(&[&[0]], vec![(256, V::Short(vec![1]))]);
		assert!(matches!(
			Ifd::read(&raw[..raw.len() - 10], 1),
			Err(IngestError::Eof(ImageKind::Tiff, _)),
		));
		assert_eq!(
			Ifd::read(b"XX*\0\x08\0\0\0", 1).unwrap_err(),
			IngestError::Corrupt(ImageKind::Tiff, "byte order"),
		);
	}
}
