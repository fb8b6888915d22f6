/*!
# `Raster Ingest` - BMP Images.
*/

use crate::{
	codec::{
		buffer_size,
		flip_rows,
		pack,
		rle::{
			self,
			Rle,
		},
		row_bytes,
	},
	cursor::Cursor,
	FLAG_BMP_NO_HEADER,
	Image,
	image::dpi_from_ppm,
	ImageKind,
	IngestError,
	MaskKind,
	Palette,
	traits::Decoder,
};
use rgb::RGB8;



/// # File Header Size.
const FILE_HEADER: usize = 14;

/// # Color Space: sRGB.
const LCS_SRGB: u32 = 0x7352_4742;

/// # Color Space: Windows Default.
const LCS_WINDOWS: u32 = 0x5769_6E20;

/// # Color Space: Embedded Profile.
const LCS_EMBEDDED: u32 = 0x4D42_4544;



/// # BMP Image.
pub(crate) struct ImageBmp;

impl Decoder for ImageBmp {
	const KIND: ImageKind = ImageKind::Bmp;

	/// # Decode.
	fn decode(raw: &[u8], flags: u8) -> Result<Image, IngestError> {
		let mut cur = Cursor::new(raw, ImageKind::Bmp);

		// The file header is only really needed for the pixel offset.
		let offset =
			if 0 == flags & FLAG_BMP_NO_HEADER {
				cur.skip(10, "file header")?;
				let offset = cur.u32_le("bitmap offset")?;
				Some(usize::try_from(offset).map_err(|_| IngestError::Overflow)?)
			}
			else { None };

		let head = Header::read(&mut cur)?;
		let palette =
			if head.bpp <= 8 { read_palette(&mut cur, &head, offset)? }
			else { None };

		// Find the pixels.
		if let Some(offset) = offset { cur.seek(offset, "bitmap offset")?; }
		let data = cur.take(cur.remaining(), "pixels")?;

		let mut img = match head.bpp {
			1 | 4 | 8 => {
				let samples = decode_indexed(data, &head)?;
				let palette = palette.unwrap_or_else(|| {
					log::debug!("BMP: no palette; using a grey ramp.");
					Palette::grey(head.bpp)
				});
				Image::raw(ImageKind::Bmp, head.width, head.height, head.bpp, 1, samples)?
					.with_palette(palette)
			},
			24 if head.compression == Compression::Rgb => {
				let rgb = decode_24(data, &head)?;
				Image::raw(ImageKind::Bmp, head.width, head.height, 8, 3, rgb)?
			},
			16 | 32 if matches!(head.compression, Compression::Rgb | Compression::Bitfields) => {
				let (rgb, alpha) = decode_fields(data, &head)?;
				let img = Image::raw(ImageKind::Bmp, head.width, head.height, 8, 3, rgb)?;
				if let Some(alpha) = alpha {
					img.with_mask(Image::mask(ImageKind::Bmp, head.width, head.height, MaskKind::Soft, alpha)?)
				}
				else { img }
			},
			_ => return Err(IngestError::Unsupported(ImageKind::Bmp, "bit depth")),
		};

		if 0 < head.ppm.0 && 0 < head.ppm.1 {
			img = img.with_dpi(dpi_from_ppm(head.ppm.0), dpi_from_ppm(head.ppm.1));
		}

		// An embedded profile is located relative to the info header.
		if let Some((pos, len)) = head.icc {
			let icc = raw.get(pos..pos.saturating_add(len))
				.ok_or(IngestError::Eof(ImageKind::Bmp, "ICC profile"))?;
			img = img.with_icc_profile(icc.to_vec());
		}

		Ok(img)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Compression.
enum Compression {
	/// # None.
	Rgb,
	/// # RLE (8-bit).
	Rle8,
	/// # RLE (4-bit).
	Rle4,
	/// # Bitfields.
	Bitfields,
}

impl TryFrom<u32> for Compression {
	type Error = IngestError;

	fn try_from(src: u32) -> Result<Self, Self::Error> {
		match src {
			0 => Ok(Self::Rgb),
			1 => Ok(Self::Rle8),
			2 => Ok(Self::Rle4),
			3 => Ok(Self::Bitfields),
			_ => Err(IngestError::Unsupported(ImageKind::Bmp, "compression")),
		}
	}
}



#[derive(Debug)]
/// # Info Header.
///
/// The parts of the (many kinds of) info header we actually use.
struct Header {
	/// # Header Size.
	size: usize,
	width: usize,
	height: usize,
	bottom_up: bool,
	bpp: u8,
	compression: Compression,
	/// # Bytes Per Palette Entry.
	entry_size: usize,
	colors_used: u32,
	/// # Pixels Per Meter (X, Y).
	ppm: (u32, u32),
	/// # Red, Green, Blue, Alpha Masks.
	masks: [u32; 4],
	/// # Extra Bytes Following the Header.
	///
	/// A v3 header with bitfield compression keeps its masks here.
	extra: usize,
	/// # ICC Profile Position and Length.
	icc: Option<(usize, usize)>,
}

impl Header {
	/// # Read.
	///
	/// Parse the info header, leaving the cursor at the start of the palette.
	fn read(cur: &mut Cursor) -> Result<Self, IngestError> {
		let start = cur.pos();
		let size = cur.u32_le("header size")?;

		let head = match size {
			12 => Self::read_os2(cur),
			40 | 52 | 56 | 108 | 124 => {
				let size = usize::try_from(size).map_err(|_| IngestError::Overflow)?;
				let width = cur.i32_le("width")?;
				let height = cur.i32_le("height")?;
				cur.skip(2, "planes")?;
				let bpp = cur.u16_le("bit count")?;
				let compression = Compression::try_from(cur.u32_le("compression")?)?;
				cur.skip(4, "image size")?;
				let x_ppm = cur.i32_le("x resolution")?;
				let y_ppm = cur.i32_le("y resolution")?;
				let colors_used = cur.u32_le("colors used")?;
				cur.skip(4, "colors important")?;

				// Masks, maybe.
				let mut masks = [0_u32; 4];
				let mut extra = 0;
				if 52 <= size {
					for m in masks.iter_mut().take(if size == 52 { 3 } else { 4 }) {
						*m = cur.u32_le("bitfields")?;
					}
				}
				else if compression == Compression::Bitfields {
					for m in masks.iter_mut().take(3) {
						*m = cur.u32_le("bitfields")?;
					}
					extra = 12;
				}

				// Color space stuff.
				let mut icc = None;
				if 108 <= size {
					let space = cur.u32_le("color space")?;
					match space {
						LCS_SRGB | LCS_WINDOWS => {},
						LCS_EMBEDDED if size == 124 => {
							cur.skip(36 + 12 + 4, "endpoints")?;
							let pos = cur.u32_le("profile offset")?;
							let len = cur.u32_le("profile size")?;
							icc = Some((
								usize::try_from(pos).ok()
									.and_then(|pos| pos.checked_add(start))
									.ok_or(IngestError::Overflow)?,
								usize::try_from(len).map_err(|_| IngestError::Overflow)?,
							));
						},
						_ => return Err(IngestError::Unsupported(ImageKind::Bmp, "color space")),
					}
				}

				cur.seek(start + size + extra, "header size")?;

				let bottom_up = 0 < height;
				let bpp = u8::try_from(bpp)
					.map_err(|_| IngestError::Unsupported(ImageKind::Bmp, "bit depth"))?;
				match (compression, bpp) {
					(Compression::Rle8, 8) | (Compression::Rle4, 4) |
					(Compression::Bitfields, 16 | 32) | (Compression::Rgb, _) => {},
					_ => return Err(IngestError::Corrupt(ImageKind::Bmp, "compression")),
				}

				Ok(Self {
					size,
					width: usize::try_from(width).map_err(|_| IngestError::Corrupt(ImageKind::Bmp, "width"))?,
					height: usize::try_from(height.unsigned_abs()).map_err(|_| IngestError::Overflow)?,
					bottom_up,
					bpp,
					compression,
					entry_size: 4,
					colors_used,
					ppm: (
						u32::try_from(x_ppm).unwrap_or(0),
						u32::try_from(y_ppm).unwrap_or(0),
					),
					masks,
					extra,
					icc,
				})
			},
			_ => Err(IngestError::Unsupported(ImageKind::Bmp, "header size")),
		}?;

		if head.width == 0 { Err(IngestError::Corrupt(ImageKind::Bmp, "width")) }
		else if head.height == 0 { Err(IngestError::Corrupt(ImageKind::Bmp, "height")) }
		else { Ok(head) }
	}

	/// # Read OS/2 Header.
	fn read_os2(cur: &mut Cursor) -> Result<Self, IngestError> {
		let width = cur.u16_le("width")?;
		let height = cur.u16_le("height")?;
		cur.skip(2, "planes")?;
		let bpp = cur.u16_le("bit count")?;

		Ok(Self {
			size: 12,
			width: width.into(),
			height: height.into(),
			bottom_up: true,
			bpp: u8::try_from(bpp)
				.map_err(|_| IngestError::Unsupported(ImageKind::Bmp, "bit depth"))?,
			compression: Compression::Rgb,
			entry_size: 3,
			colors_used: 0,
			ppm: (0, 0),
			masks: [0; 4],
			extra: 0,
			icc: None,
		})
	}

	/// # Row Stride.
	///
	/// Rows are padded to a multiple of four bytes.
	fn stride(&self) -> Result<usize, IngestError> {
		row_bytes(self.width, usize::from(self.bpp))?
			.checked_next_multiple_of(4)
			.ok_or(IngestError::Overflow)
	}

	/// # Rows (Top Down).
	///
	/// Yield the storage index of each row in display order.
	fn rows(&self) -> impl Iterator<Item=usize> {
		let (height, bottom_up) = (self.height, self.bottom_up);
		(0..height).map(move |y| if bottom_up { height - 1 - y } else { y })
	}
}



/// # Read Palette.
///
/// When the file header is present, the palette size is whatever fits
/// between the info header and the bitmap offset. For headerless data it is
/// implied by the bit depth or colors-used count.
fn read_palette(cur: &mut Cursor, head: &Header, offset: Option<usize>)
-> Result<Option<Palette>, IngestError> {
	let implied = 1_usize << head.bpp;
	let count = match offset {
		Some(offset) => offset.saturating_sub(FILE_HEADER + head.size + head.extra) / head.entry_size,
		None => {
			log::debug!("BMP: inferring palette size from the bit depth.");
			match usize::try_from(head.colors_used) {
				Ok(n) if n != 0 => n,
				_ => implied,
			}
		},
	}.min(implied);

	let raw = cur.take(count * head.entry_size, "palette")?;
	Ok(Palette::from_entries(
		raw.chunks_exact(head.entry_size)
			.map(|c| RGB8::new(c[2], c[1], c[0]))
			.collect()
	))
}

/// # Padded Rows.
///
/// Return a zero-filled buffer holding every stored row. The final row's
/// padding may be missing from the source, but nothing else.
fn padded(data: &[u8], stride: usize, height: usize, row_len: usize)
-> Result<Vec<u8>, IngestError> {
	let total = buffer_size(stride, height)?;
	if data.len() < total.saturating_sub(stride) + row_len {
		return Err(IngestError::Eof(ImageKind::Bmp, "pixels"));
	}

	let mut out = vec![0_u8; total];
	let len = total.min(data.len());
	out[..len].copy_from_slice(&data[..len]);
	Ok(out)
}

/// # Decode Indexed.
///
/// Return packed, top-down palette indices at the source bit depth.
fn decode_indexed(data: &[u8], head: &Header) -> Result<Vec<u8>, IngestError> {
	let row_len = row_bytes(head.width, usize::from(head.bpp))?;

	let flavor = match head.compression {
		Compression::Rle8 => Rle::Eight,
		Compression::Rle4 => Rle::Four,
		_ => {
			let stride = head.stride()?;
			let src = padded(data, stride, head.height, row_len)?;
			let mut out = Vec::with_capacity(buffer_size(row_len, head.height)?);
			for y in head.rows() {
				out.extend_from_slice(&src[y * stride..y * stride + row_len]);
			}
			return Ok(out);
		},
	};

	// RLE produces one index per byte.
	buffer_size(head.width, head.height)?;
	let mut idx = rle::decode(data, head.width, head.height, flavor);
	if head.bottom_up { flip_rows(&mut idx, head.width); }
	pack(idx, head.width, head.height, head.bpp)
}

/// # Decode 24-bit.
///
/// Convert BGR to RGB, top-down.
fn decode_24(data: &[u8], head: &Header) -> Result<Vec<u8>, IngestError> {
	let row_len = buffer_size(head.width, 3)?;
	let stride = head.stride()?;
	let src = padded(data, stride, head.height, row_len)?;

	let mut out = Vec::with_capacity(buffer_size(row_len, head.height)?);
	for y in head.rows() {
		for px in src[y * stride..y * stride + row_len].chunks_exact(3) {
			out.extend_from_slice(&[px[2], px[1], px[0]]);
		}
	}
	Ok(out)
}

/// # Decode 16/32-bit.
///
/// Extract RGB (and possibly alpha) using the channel masks.
fn decode_fields(data: &[u8], head: &Header) -> Result<(Vec<u8>, Option<Vec<u8>>), IngestError> {
	let bytes = usize::from(head.bpp / 8);
	let [r, g, b, a] =
		if head.compression == Compression::Bitfields { head.masks }
		else if bytes == 2 { [0x7C00, 0x03E0, 0x001F, 0] }
		else { [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0] };
	let fields = [Field::new(r), Field::new(g), Field::new(b)];
	let alpha_field = Field::new(a);

	let row_len = buffer_size(head.width, bytes)?;
	let stride = head.stride()?;
	let src = padded(data, stride, head.height, row_len)?;

	let px_count = buffer_size(head.width, head.height)?;
	let mut rgb = Vec::with_capacity(px_count * 3);
	let mut alpha = Vec::with_capacity(if a == 0 { 0 } else { px_count });
	for y in head.rows() {
		for px in src[y * stride..y * stride + row_len].chunks_exact(bytes) {
			let v = match *px {
				[lo, hi] => u32::from(u16::from_le_bytes([lo, hi])),
				[b0, b1, b2, b3] => u32::from_le_bytes([b0, b1, b2, b3]),
				_ => 0,
			};
			rgb.extend(fields.iter().map(|f| f.get(v)));
			if a != 0 { alpha.push(alpha_field.get(v)); }
		}
	}

	// Alpha is only meaningful if it was actually used for something.
	let alpha = Some(alpha).filter(|a|
		a.iter().any(|&v| v != 0) && a.iter().any(|&v| v != u8::MAX)
	);

	Ok((rgb, alpha))
}



#[derive(Debug, Clone, Copy)]
/// # Bitfield Channel.
struct Field {
	mask: u32,
	shift: u32,
	max: u64,
}

impl Field {
	/// # New.
	const fn new(mask: u32) -> Self {
		let shift = if mask == 0 { 0 } else { mask.trailing_zeros() };
		Self { mask, shift, max: (mask >> shift) as u64 }
	}

	/// # Scaled Value.
	///
	/// Extract the channel and scale it to eight bits.
	fn get(self, v: u32) -> u8 {
		if self.mask == 0 { return 0; }
		let v = u64::from((v & self.mask) >> self.shift);
		u8::try_from(v * 256 / (self.max + 1)).unwrap_or(u8::MAX)
	}
}
