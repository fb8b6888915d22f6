/*!
# `Raster Ingest` - TIFF Images.

Only strip-based, chunky (interleaved) TIFFs are handled. Bilevel fax
strips are stitched into a single Group 4 stream, JPEG strips are passed
through, and everything else is decompressed and re-deflated.
*/

mod ifd;

use crate::{
	codec::{
		buffer_size,
		fax::{
			self,
			Scheme,
		},
		flate,
		lzw::Lzw,
		packbits,
		row_bytes,
	},
	DecodeParms,
	Filter,
	FLAG_RAW,
	FLAG_TIFF_RECOVER,
	Image,
	image::dpi_round,
	ImageKind,
	IngestError,
	MaskKind,
	Palette,
	traits::Decoder,
};
use ifd::Ifd;
use rgb::RGB8;
use std::f32::consts::PI;
use super::jpeg::JpegInfo;



/// # Tag: Image Width.
const TAG_WIDTH: u16 = 256;

/// # Tag: Image Length.
const TAG_HEIGHT: u16 = 257;

/// # Tag: Bits Per Sample.
const TAG_BITS: u16 = 258;

/// # Tag: Compression.
const TAG_COMPRESSION: u16 = 259;

/// # Tag: Photometric Interpretation.
const TAG_PHOTOMETRIC: u16 = 262;

/// # Tag: Fill Order.
const TAG_FILL_ORDER: u16 = 266;

/// # Tag: Strip Offsets.
const TAG_STRIP_OFFSETS: u16 = 273;

/// # Tag: Orientation.
const TAG_ORIENTATION: u16 = 274;

/// # Tag: Samples Per Pixel.
const TAG_SAMPLES: u16 = 277;

/// # Tag: Rows Per Strip.
const TAG_ROWS_PER_STRIP: u16 = 278;

/// # Tag: Strip Byte Counts.
const TAG_STRIP_COUNTS: u16 = 279;

/// # Tag: X Resolution.
const TAG_X_RES: u16 = 282;

/// # Tag: Y Resolution.
const TAG_Y_RES: u16 = 283;

/// # Tag: Planar Configuration.
const TAG_PLANAR: u16 = 284;

/// # Tag: T4 Options.
const TAG_T4_OPTIONS: u16 = 292;

/// # Tag: Resolution Unit.
const TAG_RES_UNIT: u16 = 296;

/// # Tag: Predictor.
const TAG_PREDICTOR: u16 = 317;

/// # Tag: Color Map.
const TAG_COLOR_MAP: u16 = 320;

/// # Tag: Tile Width.
const TAG_TILE_WIDTH: u16 = 322;

/// # Tag: Tile Offsets.
const TAG_TILE_OFFSETS: u16 = 324;

/// # Tag: JPEG Tables.
const TAG_JPEG_TABLES: u16 = 347;

/// # Tag: JPEG Interchange Format (Old-Style).
const TAG_JPEG_OFFSET: u16 = 513;

/// # Tag: JPEG Interchange Format Length (Old-Style).
const TAG_JPEG_LENGTH: u16 = 514;

/// # Tag: ICC Profile.
const TAG_ICC: u16 = 34675;



/// # TIFF Image.
pub(crate) struct ImageTiff;

impl Decoder for ImageTiff {
	const KIND: ImageKind = ImageKind::Tiff;

	/// # Decode.
	///
	/// This decodes the first page.
	fn decode(raw: &[u8], flags: u8) -> Result<Image, IngestError> {
		decode_page(raw, 1, flags)
	}
}

/// # Decode TIFF.
///
/// Decode a specific (1-based) page from a TIFF.
///
/// ## Errors
///
/// Returns a mismatch error if the data is not a TIFF, a page-not-found
/// error if the directory chain is too short, or any errors encountered
/// while decoding.
pub fn decode_tiff(raw: &[u8], page: u32, flags: u8) -> Result<Image, IngestError> {
	ImageKind::Tiff.check(raw)?;
	decode_page(raw, page, flags)
}

/// # Decode Page.
fn decode_page(raw: &[u8], page: u32, flags: u8) -> Result<Image, IngestError> {
	if page == 0 { return Err(IngestError::PageNotFound(0)); }

	let ifd = Ifd::read(raw, page)?;
	let tiff = Page::new(raw, &ifd)?;
	let img = match tiff.compression {
		1 | 5 | 8 | 32773 | 32946 => tiff.decode_pixels(&ifd, flags),
		2..=4 => tiff.decode_fax(flags),
		6 | 7 => tiff.decode_jpeg(raw, &ifd),
		_ => Err(IngestError::Unsupported(ImageKind::Tiff, "compression")),
	}?;

	Ok(tiff.finish(img, &ifd))
}



#[derive(Debug)]
/// # Page.
///
/// The settings shared by all the decoding paths.
struct Page<'a> {
	width: usize,
	height: usize,
	bits: u8,
	samples: u8,
	compression: u32,
	photometric: u32,
	fill_order: u32,
	predictor: u32,
	t4_options: u32,
	rows_per_strip: usize,
	strips: Vec<&'a [u8]>,
	rotation: f32,
}

impl<'a> Page<'a> {
	/// # New.
	fn new(raw: &'a [u8], ifd: &Ifd<'a>) -> Result<Self, IngestError> {
		if ifd.has(TAG_TILE_WIDTH) || ifd.has(TAG_TILE_OFFSETS) {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "tiles"));
		}

		let width = ifd.value(TAG_WIDTH)
			.ok_or(IngestError::Corrupt(ImageKind::Tiff, "ImageWidth"))?;
		let width = usize::try_from(width).map_err(|_| IngestError::Overflow)?;
		let height = ifd.value(TAG_HEIGHT)
			.ok_or(IngestError::Corrupt(ImageKind::Tiff, "ImageLength"))?;
		let height = usize::try_from(height).map_err(|_| IngestError::Overflow)?;

		let samples = u8::try_from(ifd.value(TAG_SAMPLES).unwrap_or(1))
			.map_err(|_| IngestError::Unsupported(ImageKind::Tiff, "samples per pixel"))?;
		if 1 < samples && ifd.value(TAG_PLANAR) == Some(2) {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "planar configuration"));
		}
		let bits = u8::try_from(ifd.value(TAG_BITS).unwrap_or(1))
			.map_err(|_| IngestError::Unsupported(ImageKind::Tiff, "bit depth"))?;

		let compression = ifd.value(TAG_COMPRESSION).unwrap_or(1);
		let photometric = ifd.value(TAG_PHOTOMETRIC).unwrap_or(
			if (2..=4).contains(&compression) { 0 }
			else if 3 <= samples { 2 }
			else { 1 }
		);

		let predictor = ifd.value(TAG_PREDICTOR).unwrap_or(1);
		match predictor {
			1 => {},
			2 if bits == 8 => {},
			_ => return Err(IngestError::Unsupported(ImageKind::Tiff, "predictor")),
		}

		let rows_per_strip = match ifd.value(TAG_ROWS_PER_STRIP).map(usize::try_from) {
			Some(Ok(n)) if 0 < n && n <= height => n,
			_ => height,
		};

		// Counter-clockwise, in radians.
		let rotation = match ifd.value(TAG_ORIENTATION).unwrap_or(1) {
			3 | 4 => PI,
			5 | 6 => -PI / 2.0,
			7 | 8 => PI / 2.0,
			_ => 0.0,
		};

		Ok(Self {
			width,
			height,
			bits,
			samples,
			compression,
			photometric,
			fill_order: ifd.value(TAG_FILL_ORDER).unwrap_or(1),
			predictor,
			t4_options: ifd.value(TAG_T4_OPTIONS).unwrap_or(0),
			rows_per_strip,
			strips: strips(raw, ifd)?,
			rotation,
		})
	}

	/// # Strip Rows.
	///
	/// Return the number of rows held by the `idx`th strip.
	fn strip_rows(&self, idx: usize) -> usize {
		self.height
			.saturating_sub(idx.saturating_mul(self.rows_per_strip))
			.min(self.rows_per_strip)
	}

	/// # Finish.
	///
	/// Apply the page-level metadata.
	fn finish(&self, mut img: Image, ifd: &Ifd) -> Image {
		match (ifd.rational(TAG_X_RES), ifd.rational(TAG_Y_RES), ifd.value(TAG_RES_UNIT).unwrap_or(2)) {
			(Some(x), Some(y), 2) => { img = img.with_dpi(dpi_round(x), dpi_round(y)); },
			(Some(x), Some(y), 3) => {
				img = img.with_dpi(dpi_round(x * 2.54), dpi_round(y * 2.54));
			},
			#[allow(clippy::cast_possible_truncation)] // It's a ratio.
			(Some(x), Some(y), 1) if 0.0 < y => { img = img.with_xy_ratio((x / y) as f32); },
			_ => {},
		}

		if self.rotation != 0.0 { img = img.with_rotation(self.rotation); }

		if img.icc_profile().is_none() {
			if let Some(icc) = ifd.bytes(TAG_ICC) {
				img = img.with_icc_profile(icc.to_vec());
			}
		}

		img
	}
}

/// # Strips.
///
/// Resolve the strip offsets and byte counts into slices. If there's only
/// one strip and its byte count is missing or nonsensical, everything from
/// the offset to the end of the file is used.
fn strips<'a>(raw: &'a [u8], ifd: &Ifd) -> Result<Vec<&'a [u8]>, IngestError> {
	let offsets = ifd.values(TAG_STRIP_OFFSETS)
		.filter(|v| ! v.is_empty())
		.ok_or(IngestError::Corrupt(ImageKind::Tiff, "StripOffsets"))?;
	let counts = match ifd.values(TAG_STRIP_COUNTS) {
		Some(c) if c.len() == offsets.len() && (1 < c.len() || c[0] != 0) => c,
		_ if offsets.len() == 1 => {
			log::debug!("TIFF: ignoring the byte count of the only strip.");
			vec![u32::MAX]
		},
		_ => return Err(IngestError::Corrupt(ImageKind::Tiff, "StripByteCounts")),
	};

	offsets.into_iter()
		.zip(counts)
		.map(|(off, len)| {
			let rest = usize::try_from(off).ok()
				.and_then(|off| raw.get(off..))
				.ok_or(IngestError::Eof(ImageKind::Tiff, "strip"))?;
			let len = usize::try_from(len).unwrap_or(usize::MAX).min(rest.len());
			Ok(&rest[..len])
		})
		.collect()
}



/// ## Fax.
impl Page<'_> {
	/// # Decode Fax.
	///
	/// The strips are decoded and re-encoded as one Group 4 stream unless
	/// the page is simple enough to pass straight through.
	fn decode_fax(&self, flags: u8) -> Result<Image, IngestError> {
		if self.bits != 1 || self.samples != 1 {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "fax bit depth"));
		}
		if 1 < self.photometric {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "photometric interpretation"));
		}
		let width = u16::try_from(self.width)
			.map_err(|_| IngestError::Unsupported(ImageKind::Tiff, "fax width"))?;

		if
			self.strips.len() == 1 &&
			self.rotation == 0.0 &&
			self.fill_order == 1 &&
			0 == flags & FLAG_RAW
		{
			log::debug!("TIFF: passing through the fax strip.");
			return self.fax_direct();
		}

		match self.fax_rows(width) {
			Ok(packed) =>
				if 0 == flags & FLAG_RAW {
					let g4 = fax::encode_g4(&packed, width, self.height)?;
					self.fax_image(g4, Scheme::G4)
				}
				else {
					let img = Image::raw(ImageKind::Tiff, self.width, self.height, 1, 1, packed)?;
					if self.photometric == 0 { Ok(img.with_inverted()) }
					else { Ok(img) }
				},
			Err(e) if e.is_recoverable() && 0 != flags & FLAG_TIFF_RECOVER => {
				log::warn!("TIFF: fax decoding failed; falling back to the first strip.");
				self.fax_direct()
			},
			Err(e) => Err(e),
		}
	}

	/// # Scheme.
	const fn scheme(&self) -> Scheme {
		match self.compression {
			2 => Scheme::Rle,
			3 if 0 == self.t4_options & 1 => Scheme::G3,
			3 => Scheme::G3TwoD,
			_ => Scheme::G4,
		}
	}

	/// # Fax Rows.
	///
	/// Decode every strip into one packed buffer where set bits are black.
	fn fax_rows(&self, width: u16) -> Result<Vec<u8>, IngestError> {
		let scheme = self.scheme();
		let stride = row_bytes(self.width, 1)?;
		let mut out = vec![0_u8; buffer_size(stride, self.height)?];

		for (idx, strip) in self.strips.iter().enumerate() {
			let rows = self.strip_rows(idx);
			if rows == 0 { break; }

			let mut src = strip.to_vec();
			if self.fill_order == 2 { fax::reverse_bits(&mut src); }
			let dec = fax::decode(&src, width, rows, scheme)?;

			let start = idx * self.rows_per_strip * stride;
			out[start..start + dec.len()].copy_from_slice(&dec);
		}

		Ok(out)
	}

	/// # Fax (Direct).
	///
	/// Pass the first strip through in its original encoding.
	fn fax_direct(&self) -> Result<Image, IngestError> {
		let mut data = self.strips.first().map(|s| s.to_vec()).unwrap_or_default();
		if self.fill_order == 2 { fax::reverse_bits(&mut data); }
		self.fax_image(data, self.scheme())
	}

	/// # Fax Image.
	fn fax_image(&self, data: Vec<u8>, scheme: Scheme) -> Result<Image, IngestError> {
		let byte_align = scheme.byte_align() ||
			(scheme != Scheme::G4 && 0 != self.t4_options & 4);
		let parms = DecodeParms::Fax {
			k: scheme.k(),
			columns: u32::try_from(self.width).map_err(|_| IngestError::Overflow)?,
			rows: u32::try_from(self.height).map_err(|_| IngestError::Overflow)?,
			black_is_1: self.photometric == 1,
			byte_align,
		};

		Image::new(ImageKind::Tiff, self.width, self.height, 1, 1, data, Filter::CcittFax)
			.map(|img| img.with_decode_parms(parms))
	}
}



/// ## Pixels.
impl Page<'_> {
	/// # Decode Pixels.
	///
	/// Decompress the strips, undo any predictor, split off the alpha
	/// channel, and re-deflate (unless raw output was requested).
	fn decode_pixels(&self, ifd: &Ifd, flags: u8) -> Result<Image, IngestError> {
		if ! matches!(self.bits, 1 | 2 | 4 | 8) {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "bit depth"));
		}
		let colors: u8 = match self.photometric {
			0 | 1 | 3 => 1,
			2 => 3,
			5 => 4,
			_ => return Err(IngestError::Unsupported(ImageKind::Tiff, "photometric interpretation")),
		};
		let extra = self.samples.checked_sub(colors)
			.ok_or(IngestError::Corrupt(ImageKind::Tiff, "SamplesPerPixel"))?;
		if extra != 0 && self.bits != 8 {
			return Err(IngestError::Unsupported(ImageKind::Tiff, "extra samples"));
		}
		let palette = if self.photometric == 3 { Some(self.palette(ifd)?) } else { None };

		// Decompress.
		let samples = usize::from(self.samples);
		let stride = row_bytes(self.width, usize::from(self.bits) * samples)?;
		let total = buffer_size(stride, self.height)?;
		let mut data = Vec::with_capacity(total);
		for (idx, strip) in self.strips.iter().enumerate() {
			let rows = self.strip_rows(idx);
			if rows == 0 { break; }

			let expected = buffer_size(stride, rows)?;
			let mut buf = self.decompress(strip, expected)?;
			if buf.len() < expected {
				log::warn!("TIFF: strip #{idx} is short; padding with zeroes.");
			}
			buf.resize(expected, 0);

			if self.predictor == 2 {
				for row in buf.chunks_exact_mut(stride) {
					for i in samples..row.len() {
						row[i] = row[i].wrapping_add(row[i - samples]);
					}
				}
			}

			data.extend_from_slice(&buf);
		}
		if data.len() < total {
			log::warn!("TIFF: missing strips; padding with zeroes.");
			data.resize(total, 0);
		}

		// Alpha.
		let mask =
			if extra == 0 { None }
			else {
				let (color, alpha) = split_alpha(&data, samples, usize::from(colors));
				data = color;
				Some(Image::mask(ImageKind::Tiff, self.width, self.height, MaskKind::Soft, alpha)?)
			};

		let mut img =
			if 0 == flags & FLAG_RAW {
				Image::new(
					ImageKind::Tiff,
					self.width,
					self.height,
					self.bits,
					colors,
					flate::deflate(&data),
					Filter::Flate,
				)?
			}
			else {
				Image::raw(ImageKind::Tiff, self.width, self.height, self.bits, colors, data)?
			};

		if let Some(mask) = mask { img = img.with_mask(mask); }
		if let Some(palette) = palette { img = img.with_palette(palette); }
		if self.photometric == 0 { img = img.with_inverted(); }

		Ok(img)
	}

	/// # Decompress Strip.
	fn decompress(&self, strip: &[u8], expected: usize) -> Result<Vec<u8>, IngestError> {
		match self.compression {
			5 => {
				// Old-style LZW codes are written LSB-first and open with a
				// clear code.
				if let [0, b, ..] = strip {
					if 0 != b & 1 {
						return Err(IngestError::Unsupported(ImageKind::Tiff, "old-style LZW"));
					}
				}
				Ok(Lzw::tiff().decode(strip, expected))
			},
			8 | 32946 => flate::inflate(strip, ImageKind::Tiff, "strip"),
			32773 => Ok(packbits::decode(strip, expected)),
			_ => Ok(strip.to_vec()),
		}
	}

	/// # Palette.
	///
	/// Color maps hold sixteen-bit values, but some writers store eight-bit
	/// values in them instead. If every high byte is zero, the low bytes are
	/// used.
	fn palette(&self, ifd: &Ifd) -> Result<Palette, IngestError> {
		let map = ifd.values(TAG_COLOR_MAP)
			.ok_or(IngestError::Corrupt(ImageKind::Tiff, "ColorMap"))?;
		let len = 1_usize << self.bits;
		if map.len() < len * 3 {
			return Err(IngestError::Corrupt(ImageKind::Tiff, "ColorMap"));
		}

		let low = map.iter().take(len * 3).all(|&v| v < 256);
		if low { log::debug!("TIFF: reading the color map from the low bytes."); }
		let byte = |v: u32| {
			let [lo, hi, ..] = v.to_le_bytes();
			if low { lo } else { hi }
		};

		let entries = (0..len)
			.map(|i| RGB8::new(byte(map[i]), byte(map[len + i]), byte(map[len * 2 + i])))
			.collect();
		Palette::from_entries(entries)
			.ok_or(IngestError::Corrupt(ImageKind::Tiff, "ColorMap"))
	}
}

/// # Split Alpha.
///
/// Separate interleaved eight-bit samples into color and mask buffers. Only
/// the first extra sample is kept.
fn split_alpha(data: &[u8], samples: usize, colors: usize) -> (Vec<u8>, Vec<u8>) {
	let pixels = data.len() / samples;
	let mut color = Vec::with_capacity(pixels * colors);
	let mut alpha = Vec::with_capacity(pixels);
	for px in data.chunks_exact(samples) {
		color.extend_from_slice(&px[..colors]);
		alpha.push(px[colors]);
	}
	(color, alpha)
}



/// ## JPEG.
impl Page<'_> {
	/// # Decode JPEG.
	///
	/// Find the JPEG stream (merging in any shared tables) and pass it
	/// through.
	fn decode_jpeg(&self, raw: &[u8], ifd: &Ifd) -> Result<Image, IngestError> {
		let bytes =
			if self.compression == 6 {
				match (ifd.value(TAG_JPEG_OFFSET), ifd.value(TAG_JPEG_LENGTH)) {
					(Some(off), len) => {
						let rest = usize::try_from(off).ok()
							.and_then(|off| raw.get(off..))
							.ok_or(IngestError::Eof(ImageKind::Tiff, "JPEGInterchangeFormat"))?;
						let len = len.and_then(|n| usize::try_from(n).ok())
							.unwrap_or(rest.len())
							.min(rest.len());
						rest[..len].to_vec()
					},
					(None, _) => self.single_strip()?.to_vec(),
				}
			}
			else {
				let strip = self.single_strip()?;
				match ifd.bytes(TAG_JPEG_TABLES) {
					Some(tables) if 4 <= tables.len() && strip.starts_with(&[0xFF, 0xD8]) => {
						// Drop the tables' EOI and the strip's SOI.
						let mut out = tables[..tables.len() - 2].to_vec();
						out.extend_from_slice(&strip[2..]);
						out
					},
					_ => strip.to_vec(),
				}
			};

		let info = JpegInfo::read(&bytes, ImageKind::Tiff)?;
		let mut img = Image::new(
			ImageKind::Tiff,
			info.width,
			info.height,
			8,
			info.components,
			bytes,
			Filter::Dct,
		)?;
		if info.adobe && info.components == 4 { img = img.with_inverted(); }
		if let Some(icc) = info.icc { img = img.with_icc_profile(icc); }
		if let Some((x, y)) = info.dpi { img = img.with_dpi(x, y); }

		Ok(img)
	}

	/// # Single Strip.
	fn single_strip(&self) -> Result<&[u8], IngestError> {
		match self.strips.as_slice() {
			[one] => Ok(one),
			_ => Err(IngestError::Unsupported(ImageKind::Tiff, "multi-strip JPEG")),
		}
	}
}
