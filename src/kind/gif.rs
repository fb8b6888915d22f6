/*!
# `Raster Ingest` - GIF Images.
*/

use crate::{
	codec::{
		buffer_size,
		interlace::gif_rows,
		lzw::Lzw,
		pack,
	},
	cursor::Cursor,
	Image,
	ImageKind,
	IngestError,
	Palette,
	traits::Decoder,
	Transparency,
};
use std::collections::BTreeSet;



/// # Block: Image Descriptor.
const BLOCK_IMAGE: u8 = 0x2C;

/// # Block: Extension.
const BLOCK_EXTENSION: u8 = 0x21;

/// # Extension: Graphics Control.
const EXT_GRAPHICS: u8 = 0xF9;



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Frame Selection.
///
/// Frame numbers are one-based.
pub enum GifFrames {
	#[default]
	/// # The First Frame.
	First,
	/// # One Specific Frame.
	One(u32),
	/// # Several Frames.
	Set(Vec<u32>),
}

impl GifFrames {
	/// # Wanted Frames.
	fn wanted(&self) -> BTreeSet<u32> {
		match self {
			Self::First => BTreeSet::from([1]),
			Self::One(n) => BTreeSet::from([*n]),
			Self::Set(set) => set.iter().copied().collect(),
		}
	}
}



#[derive(Debug, Clone)]
/// # GIF Image.
///
/// The logical screen dimensions along with the decoded frames, in stream
/// order.
pub struct GifImage {
	width: usize,
	height: usize,
	frames: Vec<Image>,
}

impl GifImage {
	#[must_use]
	/// # Logical Width.
	pub const fn width(&self) -> usize { self.width }

	#[must_use]
	/// # Logical Height.
	pub const fn height(&self) -> usize { self.height }

	#[must_use]
	/// # Frames.
	pub fn frames(&self) -> &[Image] { &self.frames }

	#[must_use]
	/// # Into Frames.
	pub fn into_frames(self) -> Vec<Image> { self.frames }
}



/// # GIF Image (First Frame).
pub(crate) struct ImageGif;

impl Decoder for ImageGif {
	const KIND: ImageKind = ImageKind::Gif;

	/// # Decode.
	fn decode(raw: &[u8], _flags: u8) -> Result<Image, IngestError> {
		decode_gif(raw, &GifFrames::First)?
			.frames
			.into_iter()
			.next()
			.ok_or(IngestError::FrameNotFound(1))
	}
}

/// # Decode GIF.
///
/// Decode the requested frame(s) from a GIF. Parsing stops as soon as the
/// highest requested frame has been read.
///
/// ## Errors
///
/// Returns a mismatch error if the data is not a GIF, a frame-not-found
/// error if the stream ends before reaching a requested frame, or any
/// errors encountered while decoding.
pub fn decode_gif(raw: &[u8], frames: &GifFrames) -> Result<GifImage, IngestError> {
	ImageKind::Gif.check(raw)?;

	let mut wanted = frames.wanted();
	let last = wanted.last().copied().unwrap_or(0);
	if wanted.contains(&0) { return Err(IngestError::FrameNotFound(0)); }

	let mut cur = Cursor::new(raw, ImageKind::Gif);
	if ! cur.take(6, "signature")?.starts_with(b"GIF8") {
		return Err(IngestError::Corrupt(ImageKind::Gif, "signature"));
	}

	// Logical screen.
	let width = usize::from(cur.u16_le("screen width")?);
	let height = usize::from(cur.u16_le("screen height")?);
	let packed = cur.u8("screen flags")?;
	cur.skip(2, "screen flags")?;
	let global =
		if 0 == packed & 0x80 { None }
		else { Some(read_table(&mut cur, packed)?) };

	let mut out = Vec::new();
	let mut control = Control::default();
	let mut frame = 0_u32;
	while frame < last {
		match cur.u8("block") {
			Ok(BLOCK_IMAGE) => {
				frame += 1;
				let keep = wanted.remove(&frame);
				if let Some(img) = read_frame(&mut cur, global.as_ref(), control, keep)? {
					out.push(img);
				}
				control = Control::default();
			},
			Ok(BLOCK_EXTENSION) => {
				let label = cur.u8("extension")?;
				if label == EXT_GRAPHICS {
					let block = read_sub_blocks(&mut cur)?;
					control = Control::from_block(&block)?;
				}
				else {
					log::debug!("GIF: skipping extension {label:#04x}.");
					read_sub_blocks(&mut cur)?;
				}
			},
			// Trailer, garbage, or the end of the road.
			_ => break,
		}
	}

	if let Some(&missing) = wanted.first() {
		return Err(IngestError::FrameNotFound(missing));
	}

	Ok(GifImage { width, height, frames: out })
}



#[derive(Debug, Clone, Copy, Default)]
/// # Graphics Control.
///
/// This applies to the next image only.
struct Control {
	disposal: u8,
	delay: u16,
	transparent: Option<u8>,
}

impl Control {
	/// # From Block.
	fn from_block(block: &[u8]) -> Result<Self, IngestError> {
		let [packed, lo, hi, idx, ..] = *block else {
			return Err(IngestError::Eof(ImageKind::Gif, "graphics control"));
		};
		Ok(Self {
			disposal: (packed & 0x1C) >> 2,
			delay: u16::from_le_bytes([lo, hi]),
			transparent: if 0 == packed & 1 { None } else { Some(idx) },
		})
	}
}



/// # Normalize Bit Depth.
///
/// Tables of three bits are treated as four, and anything bigger than four
/// as eight.
const fn normalize_bpc(bits: u8) -> u8 {
	match bits {
		0..=2 => bits,
		3 | 4 => 4,
		_ => 8,
	}
}

/// # Read Color Table.
///
/// The table size comes from the low bits of the packed flags. It is padded
/// out to match the normalized bit depth.
fn read_table(cur: &mut Cursor, packed: u8) -> Result<(Palette, u8), IngestError> {
	let bits = (packed & 0x07) + 1;
	let raw = cur.take(3 << bits, "color table")?;
	let bpc = normalize_bpc(bits);
	let mut palette = Palette::from_rgb(raw)
		.ok_or(IngestError::Corrupt(ImageKind::Gif, "color table"))?;
	palette.pad(1 << bpc);
	Ok((palette, bpc))
}

/// # Read Sub-Blocks.
///
/// Concatenate a chain of length-prefixed sub-blocks.
fn read_sub_blocks(cur: &mut Cursor) -> Result<Vec<u8>, IngestError> {
	let mut out = Vec::new();
	loop {
		let len = usize::from(cur.u8("data block")?);
		if len == 0 { return Ok(out); }
		out.extend_from_slice(cur.take(len, "data block")?);
	}
}

/// # Read Frame.
///
/// Parse an image descriptor and its data, decoding it if `keep` is true.
fn read_frame(
	cur: &mut Cursor,
	global: Option<&(Palette, u8)>,
	control: Control,
	keep: bool,
) -> Result<Option<Image>, IngestError> {
	let left = cur.u16_le("frame left")?;
	let top = cur.u16_le("frame top")?;
	let width = usize::from(cur.u16_le("frame width")?);
	let height = usize::from(cur.u16_le("frame height")?);
	let packed = cur.u8("frame flags")?;
	let local =
		if 0 == packed & 0x80 { None }
		else { Some(read_table(cur, packed)?) };
	let min_bits = cur.u8("LZW code size")?;
	let data = read_sub_blocks(cur)?;

	if ! keep { return Ok(None); }

	let (palette, bpc) = match local.or_else(|| global.cloned()) {
		Some(table) => table,
		None => {
			log::debug!("GIF: no color table; using a grey ramp.");
			let bpc = normalize_bpc(min_bits.clamp(1, 8));
			(Palette::grey(bpc), bpc)
		},
	};

	// Decompress the indices.
	let size = buffer_size(width, height)?;
	let mut lzw = Lzw::gif(min_bits)
		.ok_or(IngestError::Corrupt(ImageKind::Gif, "LZW code size"))?;
	let mut indices = lzw.decode(&data, size);
	indices.resize(size, 0);

	// Put interlaced rows back in order.
	if 0 != packed & 0x40 && 0 != width {
		let mut ordered = vec![0_u8; size];
		for (src, dst) in indices.chunks_exact(width).zip(gif_rows(height)) {
			ordered[dst * width..(dst + 1) * width].copy_from_slice(src);
		}
		indices = ordered;
	}

	let transparent = control.transparent.filter(|&idx| usize::from(idx) < palette.len());
	let mut img = Image::raw(ImageKind::Gif, width, height, bpc, 1, pack(indices, width, height, bpc)?)?
		.with_palette(palette)
		.with_attribute("left", left.to_string())
		.with_attribute("top", top.to_string())
		.with_attribute("delay", control.delay.to_string())
		.with_attribute("disposal", control.disposal.to_string());
	if let Some(idx) = transparent {
		let idx = u16::from(idx);
		img = img.with_transparency(Transparency::ColorKey(vec![(idx, idx)]));
	}

	Ok(Some(img))
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::lzw::{
		BitOrder,
		tests::encode_literal,
	};

	/// # Frame.
	///
	/// Build a graphics control extension plus an image descriptor.
	fn frame(w: u16, h: u16, interlaced: bool, transparent: Option<u8>, indices: &[u8]) -> Vec<u8> {
		let mut out = Vec::new();
		if let Some(idx) = transparent {
			out.extend_from_slice(&[0x21, 0xF9, 4, 0b0000_1001, 10, 0, idx, 0]);
		}
		out.push(0x2C);
		out.extend_from_slice(&[1, 0, 2, 0]);
		out.extend_from_slice(&w.to_le_bytes());
		out.extend_from_slice(&h.to_le_bytes());
		out.push(if interlaced { 0x40 } else { 0 });
		out.push(2);
		let data = encode_literal(indices, 2, BitOrder::Lsb, false);
		for chunk in data.chunks(255) {
			out.push(u8::try_from(chunk.len()).unwrap());
			out.extend_from_slice(chunk);
		}
		out.push(0);
		out
	}

	/// # GIF.
	///
	/// Wrap frames with a header and four-color global table.
	fn gif(frames: &[Vec<u8>]) -> Vec<u8> {
		let mut out = b"GIF89a".to_vec();
		out.extend_from_slice(&[4, 0, 3, 0, 0b1000_0001, 0, 0]);
		out.extend_from_slice(&[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]);
		// An application extension to skip.
		out.extend_from_slice(&[0x21, 0xFF, 3, b'a', b'b', b'c', 0]);
		for f in frames { out.extend_from_slice(f); }
		out.push(0x3B);
		out
	}

	/// # Image Block.
	///
	/// A 2x1 image descriptor, with an optional local table given as its
	/// size flag and entries.
	fn image_block(local: Option<(u8, &[u8])>, min_bits: u8, indices: &[u8]) -> Vec<u8> {
		let mut out = vec![0x2C, 0, 0, 0, 0, 2, 0, 1, 0];
		match local {
			Some((flag, table)) => {
				out.push(0x80 | flag);
				out.extend_from_slice(table);
			},
			None => out.push(0),
		}
		out.push(min_bits);
		let data = encode_literal(indices, min_bits, BitOrder::Lsb, false);
		out.push(u8::try_from(data.len()).unwrap());
		out.extend_from_slice(&data);
		out.push(0);
		out
	}

	#[test]
	fn t_table_sizes() {
		// Two, sixteen, and 256 entries; the highest index is used.
		for (flag, bpc, min_bits) in [(0_u8, 1_u8, 2_u8), (3, 4, 4), (7, 8, 8)] {
			let len = 2_usize << flag;
			let table: Vec<u8> = (0..len * 3).map(|n| u8::try_from(n % 251).unwrap()).collect();
			let last = u8::try_from(len - 1).unwrap();
			let expected = pack(vec![last, 0], 2, 1, bpc).unwrap();

			// As a local table, overriding the global one.
			let raw = gif(&[image_block(Some((flag, &table)), min_bits, &[last, 0])]);
			let img = ImageGif::decode_checked(&raw, 0).unwrap();
			assert_eq!(img.bpc(), bpc);
			let pal = img.palette().unwrap();
			assert_eq!(pal.len(), len);
			assert_eq!(pal.hival(), len - 1);
			assert_eq!(pal.table(), table.as_slice());
			assert_eq!(&*img, expected.as_slice());

			// As the global table.
			let mut raw = b"GIF89a".to_vec();
			raw.extend_from_slice(&[2, 0, 1, 0, 0x80 | flag, 0, 0]);
			raw.extend_from_slice(&table);
			raw.extend_from_slice(&image_block(None, min_bits, &[last, 0]));
			raw.push(0x3B);
			let img = ImageGif::decode_checked(&raw, 0).unwrap();
			assert_eq!(img.bpc(), bpc);
			assert_eq!(img.palette().map(Palette::len), Some(len));
			assert_eq!(&*img, expected.as_slice());
		}
	}

	#[test]
	fn t_first() {
		let raw = gif(&[frame(3, 1, false, None, &[0, 1, 2])]);
		let img = ImageGif::decode_checked(&raw, 0).unwrap();
		assert_eq!((img.width(), img.height(), img.bpc()), (3, 1, 2));
		assert_eq!(&*img, &[0b0001_1000]);
		assert_eq!(img.palette().unwrap().len(), 4);
		assert_eq!(img.attribute("left"), Some("1"));
		assert_eq!(img.attribute("top"), Some("2"));
		assert!(img.transparency().is_none());
	}

	#[test]
	fn t_frames() {
		let raw = gif(&[
			frame(1, 1, false, None, &[1]),
			frame(1, 1, false, Some(2), &[2]),
			frame(1, 1, false, None, &[3]),
		]);

		let out = decode_gif(&raw, &GifFrames::Set(vec![3, 2])).unwrap();
		assert_eq!((out.width(), out.height()), (4, 3));
		let frames = out.into_frames();
		assert_eq!(frames.len(), 2);
		assert_eq!(&*frames[0], &[0b1000_0000]);
		assert_eq!(&*frames[1], &[0b1100_0000]);

		// The second frame has a graphics control.
		assert_eq!(frames[0].attribute("delay"), Some("10"));
		assert_eq!(frames[0].attribute("disposal"), Some("2"));
		assert_eq!(
			frames[0].transparency().and_then(Transparency::color_key),
			Some(&[(2, 2)][..]),
		);
		assert_eq!(frames[1].attribute("delay"), Some("0"));

		let out = decode_gif(&raw, &GifFrames::One(2)).unwrap();
		assert_eq!(out.frames().len(), 1);

		assert_eq!(
			decode_gif(&raw, &GifFrames::One(4)).unwrap_err(),
			IngestError::FrameNotFound(4),
		);
		assert_eq!(
			decode_gif(&raw, &GifFrames::Set(vec![1, 7])).unwrap_err(),
			IngestError::FrameNotFound(7),
		);
		assert_eq!(
			decode_gif(&raw, &GifFrames::One(0)).unwrap_err(),
			IngestError::FrameNotFound(0),
		);
	}

	#[test]
	fn t_interlaced() {
		// Stored rows come out in pass order: 0, 8, 4, 2, 6, 1, 3, 5, 7, 9.
		let order = [0_u8, 8, 4, 2, 6, 1, 3, 5, 7, 9];
		let indices: Vec<u8> = order.iter().map(|&y| y % 4).collect();
		let raw = gif(&[frame(1, 10, true, None, &indices)]);
		let img = ImageGif::decode_checked(&raw, 0).unwrap();

		let expected = pack((0..10_u8).map(|y| y % 4).collect(), 1, 10, 2).unwrap();
		assert_eq!(&*img, expected.as_slice());
	}

	#[test]
	fn t_transparent_out_of_range() {
		let raw = gif(&[frame(1, 1, false, Some(9), &[0])]);
		let img = ImageGif::decode_checked(&raw, 0).unwrap();
		assert!(img.transparency().is_none());
	}

	#[test]
	fn t_normalize() {
		assert_eq!(normalize_bpc(1), 1);
		assert_eq!(normalize_bpc(2), 2);
		assert_eq!(normalize_bpc(3), 4);
		assert_eq!(normalize_bpc(5), 8);
		assert_eq!(normalize_bpc(8), 8);
	}

	#[test]
	fn t_errors() {
		assert!(matches!(
			ImageGif::decode_checked(b"\x89PNG\r\n\x1a\n", 0),
			Err(IngestError::Mismatch { .. }),
		));

		// No frames at all.
		let raw = gif(&[]);
		assert_eq!(ImageGif::decode_checked(&raw, 0).unwrap_err(), IngestError::FrameNotFound(1));

		// Truncated table.
		assert_eq!(
			ImageGif::decode_checked(b"GIF89a\x01\x00\x01\x00\x87\x00\x00\x00", 0).unwrap_err(),
			IngestError::Eof(ImageKind::Gif, "color table"),
		);
	}
}
