/*!
# `Raster Ingest` - PNG Images.
*/

mod chunk;
mod filter;

use chunk::{
	Chunks,
	Header,
};
use crate::{
	Chromaticities,
	codec::{
		buffer_size,
		flate,
		get_sample,
		interlace::{
			adam7_pos,
			adam7_size,
		},
		put_sample,
		row_bytes,
	},
	DecodeParms,
	Filter,
	FLAG_RAW,
	Image,
	image::dpi_round,
	ImageKind,
	IngestError,
	MaskKind,
	Palette,
	traits::Decoder,
	Transparency,
};



/// # PNG Image.
pub(crate) struct ImagePng;

impl Decoder for ImagePng {
	const KIND: ImageKind = ImageKind::Png;

	/// # Decode.
	fn decode(raw: &[u8], flags: u8) -> Result<Image, IngestError> {
		let info = Info::read(raw)?;
		let head = info.head;
		let alpha = info.alpha();
		let key = if alpha.is_none() { info.palette_key() } else { None };

		// The compressed stream can sometimes be passed through untouched.
		let mut img =
			if
				0 == flags & FLAG_RAW &&
				! head.interlaced &&
				head.depth != 16 &&
				! head.has_alpha() &&
				alpha.is_none()
			{
				log::debug!("PNG: passing through the compressed stream.");
				let colors = head.color_channels();
				Image::new(
					ImageKind::Png,
					head.width,
					head.height,
					head.depth,
					colors,
					info.idat,
					Filter::Flate,
				)?
					.with_decode_parms(DecodeParms::Flate {
						predictor: 15,
						colors,
						bpc: head.depth,
						columns: u32::try_from(head.width).map_err(|_| IngestError::Overflow)?,
					})
			}
			else {
				let (data, mask) = decode_pixels(&info, alpha)?;
				let img = Image::raw(
					ImageKind::Png,
					head.width,
					head.height,
					head.depth.min(8),
					head.color_channels(),
					data,
				)?;
				match (alpha, mask) {
					(Some(kind), Some(mask)) => img.with_mask(
						Image::mask(ImageKind::Png, head.width, head.height, kind, mask)?
					),
					_ => img,
				}
			};

		// A single fully-transparent palette entry becomes a color key.
		if let Some(idx) = key {
			img = img.with_transparency(Transparency::ColorKey(vec![(idx, idx)]));
		}

		// Palette before profile!
		if let Some(palette) = info.palette {
			img = img.with_palette(palette);
		}
		if let Some(icc) = info.icc {
			img = img.with_icc_profile(icc);
		}

		// Color metadata.
		if info.srgb {
			img = img.with_gamma(2.2);
			if info.chrm.is_none() {
				img = img.with_chromaticities(Chromaticities::SRGB);
			}
		}
		else if let Some(gamma) = info.gamma {
			img = img.with_gamma(gamma);
		}
		if let Some(chrm) = info.chrm {
			img = img.with_chromaticities(chrm);
		}

		// Resolution.
		match info.phys {
			Some((x, y, 1)) => {
				img = img.with_dpi(
					dpi_round(f64::from(x) * 0.0254),
					dpi_round(f64::from(y) * 0.0254),
				);
			},
			#[allow(clippy::cast_precision_loss)] // It's a ratio.
			Some((x, y, 0)) if y != 0 => {
				img = img.with_xy_ratio(x as f32 / y as f32);
			},
			_ => {},
		}

		Ok(img)
	}
}



#[derive(Debug)]
/// # PNG Info.
///
/// Everything gathered from the chunk stream.
struct Info {
	head: Header,
	idat: Vec<u8>,
	palette: Option<Palette>,
	trns: Option<Vec<u8>>,
	icc: Option<Vec<u8>>,
	gamma: Option<f32>,
	chrm: Option<Chromaticities>,
	srgb: bool,
	/// # Physical Dimensions (X, Y, Unit).
	phys: Option<(u32, u32, u8)>,
}

impl Info {
	/// # Read.
	fn read(raw: &[u8]) -> Result<Self, IngestError> {
		let mut chunks = Chunks::new(raw)?;

		// The header has to come first.
		let head = match chunks.next() {
			Some(Ok((kind, data))) if &kind == b"IHDR" => Header::parse(data)?,
			Some(Err(e)) => return Err(e),
			_ => return Err(IngestError::Corrupt(ImageKind::Png, "IHDR")),
		};

		let mut out = Self {
			head,
			idat: Vec::new(),
			palette: None,
			trns: None,
			icc: None,
			gamma: None,
			chrm: None,
			srgb: false,
			phys: None,
		};

		for chunk in chunks {
			let (kind, data) = chunk?;
			match &kind {
				b"IDAT" => out.idat.extend_from_slice(data),
				b"PLTE" => {
					if head.is_indexed() { out.palette = Palette::from_rgb(data); }
				},
				b"tRNS" => { out.trns = Some(data.to_vec()); },
				b"pHYs" => if let [x0, x1, x2, x3, y0, y1, y2, y3, unit, ..] = *data {
					out.phys = Some((
						u32::from_be_bytes([x0, x1, x2, x3]),
						u32::from_be_bytes([y0, y1, y2, y3]),
						unit,
					));
				},
				b"gAMA" => if let [a, b, c, d] = *data {
					let v = u32::from_be_bytes([a, b, c, d]);
					#[allow(clippy::cast_precision_loss)] // It's a small number.
					let gamma = 100_000.0 / v as f32;
					if v != 0 { out.gamma = Some(gamma); }
				},
				b"cHRM" => { out.chrm = parse_chrm(data); },
				b"sRGB" => { out.srgb = true; },
				b"iCCP" => { out.icc = parse_iccp(data); },
				b"IEND" => break,
				_ => {
					log::debug!("PNG: skipping {} chunk.", String::from_utf8_lossy(&kind));
				},
			}
		}

		if out.idat.is_empty() {
			return Err(IngestError::Corrupt(ImageKind::Png, "IDAT"));
		}
		if head.is_indexed() && out.palette.is_none() {
			return Err(IngestError::Corrupt(ImageKind::Png, "PLTE"));
		}

		Ok(out)
	}

	/// # Mask Kind.
	///
	/// Figure out what sort of mask, if any, needs to be synthesized.
	fn alpha(&self) -> Option<MaskKind> {
		if self.head.has_alpha() { return Some(MaskKind::Soft); }
		let trns = self.trns.as_deref()?;

		match self.head.color {
			3 => {
				// Partial transparency needs a soft mask.
				if trns.iter().any(|&a| a != 0 && a != u8::MAX) {
					Some(MaskKind::Soft)
				}
				// More than one fully transparent entry needs a stencil.
				else if 1 < trns.iter().filter(|&&a| a == 0).count() {
					Some(MaskKind::Stencil)
				}
				else { None }
			},
			0 if 2 <= trns.len() => Some(MaskKind::Stencil),
			2 if 6 <= trns.len() => Some(MaskKind::Stencil),
			_ => None,
		}
	}

	/// # Palette Color Key.
	///
	/// Return the index of the only fully transparent palette entry, if
	/// that's the only sort of transparency present.
	fn palette_key(&self) -> Option<u16> {
		if ! self.head.is_indexed() { return None; }
		let trns = self.trns.as_deref()?;
		let mut zeroes = trns.iter().enumerate().filter(|(_, &a)| a == 0);
		let (idx, _) = zeroes.next()?;
		if zeroes.next().is_none() { u16::try_from(idx).ok() }
		else { None }
	}

	/// # Color Key Samples.
	///
	/// For grey and RGB images with a `tRNS` chunk, return the sample values
	/// to be treated as transparent.
	fn color_key(&self) -> Option<Vec<u16>> {
		let trns = self.trns.as_deref()?;
		let len = match self.head.color {
			0 => 1,
			2 => 3,
			_ => return None,
		};
		Some(
			trns.chunks_exact(2)
				.take(len)
				.map(|c| u16::from_be_bytes([c[0], c[1]]))
				.collect()
		)
	}
}

/// # Parse cHRM.
fn parse_chrm(data: &[u8]) -> Option<Chromaticities> {
	if data.len() < 32 { return None; }

	#[allow(clippy::cast_precision_loss)] // These are small numbers.
	let v: Vec<f32> = data.chunks_exact(4)
		.take(8)
		.map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f32 / 100_000.0)
		.collect();

	Some(Chromaticities {
		white_x: v[0],
		white_y: v[1],
		red_x: v[2],
		red_y: v[3],
		green_x: v[4],
		green_y: v[5],
		blue_x: v[6],
		blue_y: v[7],
	})
}

/// # Parse iCCP.
///
/// The chunk holds a null-terminated name, a compression method byte, and
/// then the zlib-compressed profile.
fn parse_iccp(data: &[u8]) -> Option<Vec<u8>> {
	let nul = data.iter().position(|&b| b == 0)?;
	let compressed = data.get(nul + 2..)?;
	match flate::inflate(compressed, ImageKind::Png, "iCCP") {
		Ok(icc) => Some(icc),
		Err(_) => {
			log::warn!("PNG: ignoring undecodable ICC profile.");
			None
		},
	}
}



/// # Decode Pixels.
///
/// Inflate and unfilter the image data, then split it into color samples
/// and, optionally, a mask. Sixteen-bit samples are reduced to their high
/// byte.
fn decode_pixels(info: &Info, alpha: Option<MaskKind>)
-> Result<(Vec<u8>, Option<Vec<u8>>), IngestError> {
	let head = info.head;
	let src = flate::inflate(&info.idat, ImageKind::Png, "IDAT")?;

	let channels = usize::from(head.channels());
	let colors = usize::from(head.color_channels());
	let out_bits = head.depth.min(8);
	let out_stride = row_bytes(head.width, usize::from(out_bits) * colors)?;
	let mut out = vec![0_u8; buffer_size(out_stride, head.height)?];

	// Mask setup.
	let mask_stride = match alpha {
		Some(MaskKind::Soft) => head.width,
		Some(MaskKind::Stencil) => row_bytes(head.width, 1)?,
		None => 0,
	};
	let mut mask = vec![0_u8; buffer_size(mask_stride, head.height)?];
	let trns = info.trns.as_deref().unwrap_or_default();
	let key = info.color_key();

	// Bytes per complete pixel, for the filters.
	let bits = usize::from(head.depth) * channels;
	let bpp = bits.div_ceil(8);

	let passes: &[usize] = if head.interlaced { &[0, 1, 2, 3, 4, 5, 6] } else { &[7] };
	let mut pos = 0;
	for &pass in passes {
		let (pw, ph) =
			if pass == 7 { (head.width, head.height) }
			else { adam7_size(head.width, head.height, pass) };
		if pw == 0 || ph == 0 { continue; }

		let len = row_bytes(pw, bits)?;
		let mut prev = vec![0_u8; len];
		let mut samples = vec![0_u16; channels];
		for y in 0..ph {
			let filter = *src.get(pos).ok_or(IngestError::Eof(ImageKind::Png, "IDAT"))?;
			let mut row = src.get(pos + 1..pos + 1 + len)
				.ok_or(IngestError::Eof(ImageKind::Png, "IDAT"))?
				.to_vec();
			pos += 1 + len;
			filter::unfilter_row(filter, &mut row, &prev, bpp)?;

			for x in 0..pw {
				let (dx, dy) =
					if pass == 7 { (x, y) }
					else { adam7_pos(pass, x, y) };

				for (c, s) in samples.iter_mut().enumerate() {
					*s = get_sample(&row, x * channels + c, head.depth);
				}

				// Color.
				let dst = &mut out[dy * out_stride..(dy + 1) * out_stride];
				for (c, &s) in samples.iter().take(colors).enumerate() {
					put_sample(dst, dx * colors + c, out_bits, if head.depth == 16 { s >> 8 } else { s });
				}

				// Mask.
				let Some(kind) = alpha else { continue; };
				let value: u16 =
					if head.has_alpha() {
						let a = samples[channels - 1];
						if head.depth == 16 { a >> 8 } else { a }
					}
					else if head.is_indexed() {
						trns.get(usize::from(samples[0])).map_or(255, |&a| u16::from(a))
					}
					else if key.as_deref() == Some(&samples[..colors]) { 0 }
					else { 255 };

				let dst = &mut mask[dy * mask_stride..(dy + 1) * mask_stride];
				match kind {
					MaskKind::Soft => put_sample(dst, dx, 8, value),
					MaskKind::Stencil => if value != 0 { put_sample(dst, dx, 1, 1); },
				}
			}

			prev = row;
		}
	}

	Ok((out, alpha.map(|_| mask)))
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		codec::interlace::ADAM7,
		ColorKind,
	};

	/// # CRC32.
	fn crc(data: &[u8]) -> u32 {
		let mut c = u32::MAX;
		for &b in data {
			c ^= u32::from(b);
			for _ in 0..8 {
				c = if c & 1 == 1 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
			}
		}
		! c
	}

	/// # Chunk.
	fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
		let mut out = u32::try_from(data.len()).unwrap().to_be_bytes().to_vec();
		let start = out.len();
		out.extend_from_slice(kind);
		out.extend_from_slice(data);
		let crc = crc(&out[start..]);
		out.extend_from_slice(&crc.to_be_bytes());
		out
	}

	/// # PNG.
	///
	/// Assemble a file from a header, extra (pre-IDAT) chunks, and the raw
	/// filtered scanlines.
	fn png(width: u32, height: u32, depth: u8, color: u8, interlace: u8, extra: &[Vec<u8>], lines: &[u8]) -> Vec<u8> {
		let mut ihdr = width.to_be_bytes().to_vec();
		ihdr.extend_from_slice(&height.to_be_bytes());
		ihdr.extend_from_slice(&[depth, color, 0, 0, interlace]);

		let mut out = b"\x89PNG\r\n\x1a\n".to_vec();
		out.extend_from_slice(&chunk(b"IHDR", &ihdr));
		for e in extra { out.extend_from_slice(e); }

		// Split the data across two IDATs.
		let z = flate::deflate(lines);
		let (a, b) = z.split_at(z.len() / 2);
		out.extend_from_slice(&chunk(b"IDAT", a));
		out.extend_from_slice(&chunk(b"IDAT", b));
		out.extend_from_slice(&chunk(b"IEND", &[]));
		out
	}

	#[test]
	fn t_example() {
		// 2x2 greyscale: Sub [10, 5], then Up [0, 0].
		let lines = [1, 10, 5, 2, 0, 0];
		let raw = png(2, 2, 8, 0, 0, &[], &lines);

		let img = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
		assert_eq!((img.width(), img.height(), img.bpc(), img.component_count()), (2, 2, 8, 1));
		assert_eq!(img.filter(), Filter::None);
		assert_eq!(&*img, &[10, 15, 10, 15]);

		// Without the flag, the stream passes through.
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.filter(), Filter::Flate);
		assert_eq!(
			img.decode_parms(),
			Some(DecodeParms::Flate { predictor: 15, colors: 1, bpc: 8, columns: 2 }),
		);
		assert_eq!(flate::inflate(&img, ImageKind::Png, "IDAT"), Ok(lines.to_vec()));
	}

	#[test]
	fn t_one_pixel() {
		let raw = png(1, 1, 8, 2, 0, &[], &[0, 1, 2, 3]);
		let img = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
		assert_eq!(&*img, &[1, 2, 3]);
		assert_eq!(img.color_kind(), ColorKind::Rgb);

		// Interlaced too; only the first pass has anything.
		let raw = png(1, 1, 8, 2, 1, &[], &[0, 1, 2, 3]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.filter(), Filter::None);
		assert_eq!(&*img, &[1, 2, 3]);
	}

	#[test]
	fn t_adam7() {
		// 7x5 greyscale with distinct values. Build the passes by hand.
		let (w, h) = (7_usize, 5_usize);
		let px = |x: usize, y: usize| u8::try_from(y * w + x).unwrap();
		let mut lines = Vec::new();
		for (pass, &(x0, y0, dx, dy)) in ADAM7.iter().enumerate() {
			let (pw, ph) = adam7_size(w, h, pass);
			if pw == 0 { continue; }
			for y in 0..ph {
				lines.push(0);
				for x in 0..pw { lines.push(px(x0 + x * dx, y0 + y * dy)); }
			}
		}

		let raw = png(7, 5, 8, 0, 1, &[], &lines);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		let expected: Vec<u8> = (0..35).collect();
		assert_eq!(&*img, expected.as_slice());
	}

	#[test]
	fn t_lodepng() {
		// More than 256 colors keeps lodepng from choosing a palette, and
		// its filter heuristics give every filter type a workout.
		let (w, h) = (20_usize, 20_usize);
		let src: Vec<rgb::RGB8> = (0..w * h)
			.map(|i| {
				let i = u32::try_from(i).unwrap();
				rgb::RGB8::new((i * 7 % 256) as u8, (i * 13 % 251) as u8, (i / 2) as u8)
			})
			.collect();
		let raw = lodepng::encode24(&src, w, h).unwrap();

		let img = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
		assert_eq!((img.width(), img.height()), (w, h));
		let expected: Vec<u8> = src.iter().flat_map(|px| [px.r, px.g, px.b]).collect();
		assert_eq!(&*img, expected.as_slice());

		// And lodepng agrees with what we make of a hand-built file.
		let raw = png(2, 1, 8, 2, 0, &[], &[4, 1, 2, 3, 4, 5, 6]);
		let theirs = lodepng::decode24(&raw).unwrap();
		let ours = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
		let theirs: Vec<u8> = theirs.buffer.iter().flat_map(|px| [px.r, px.g, px.b]).collect();
		assert_eq!(&*ours, theirs.as_slice());
	}

	#[test]
	fn t_low_depth() {
		// 2-bit grey, 5 wide: one padded byte per row, odd filters.
		let lines = [0, 0b0001_1011, 0b0100_0000, 1, 0b0101_0101, 0b0100_0000];
		let raw = png(5, 2, 2, 0, 0, &[], &lines);
		let img = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
		assert_eq!(img.bpc(), 2);
		// Sub on a sub-byte image works at byte granularity; the padding bits
		// are not carried over.
		assert_eq!(&*img, &[0b0001_1011, 0b0100_0000, 0b0101_0101, 0b1000_0000]);
	}

	#[test]
	fn t_sixteen() {
		let raw = png(2, 1, 16, 0, 0, &[], &[0, 0x12, 0x34, 0xAB, 0xCD]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.filter(), Filter::None);
		assert_eq!(img.bpc(), 8);
		assert_eq!(&*img, &[0x12, 0xAB]);
	}

	#[test]
	fn t_palette_key() {
		// One fully transparent entry: a color key.
		let plte = chunk(b"PLTE", &[1, 1, 1, 2, 2, 2, 3, 3, 3]);
		let trns = chunk(b"tRNS", &[255, 0, 255]);
		let raw = png(2, 1, 2, 3, 0, &[plte.clone(), trns], &[0, 0b0001_0000]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.filter(), Filter::Flate);
		assert_eq!(img.color_kind(), ColorKind::Indexed);
		assert_eq!(img.palette().unwrap().len(), 3);
		assert_eq!(
			img.transparency().and_then(Transparency::color_key),
			Some(&[(1, 1)][..]),
		);

		// Two: a stencil.
		let trns = chunk(b"tRNS", &[0, 0, 255]);
		let raw = png(3, 1, 2, 3, 0, &[plte.clone(), trns], &[0, 0b0001_1000]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.filter(), Filter::None);
		assert_eq!(&*img, &[0b0001_1000]);
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(mask.component_count(), -1);
		assert_eq!(&**mask, &[0b0010_0000]);

		// Shades: a soft mask. Short tables leave the rest opaque.
		let trns = chunk(b"tRNS", &[128]);
		let raw = png(3, 1, 2, 3, 0, &[plte, trns], &[0, 0b0001_1000]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(mask.mask_kind(), Some(MaskKind::Soft));
		assert_eq!(&**mask, &[128, 255, 255]);
	}

	#[test]
	fn t_palette_sizes() {
		// Full tables at each depth boundary; the highest index is used.
		for depth in [1_u8, 4, 8] {
			let len = 1_usize << depth;
			let plte: Vec<u8> = (0..len * 3).map(|n| (n % 256) as u8).collect();
			let last = u8::try_from(len - 1).unwrap() << (8 - depth);
			let raw = png(1, 1, depth, 3, 0, &[chunk(b"PLTE", &plte)], &[0, last]);

			let img = ImagePng::decode_checked(&raw, FLAG_RAW).unwrap();
			assert_eq!(img.bpc(), depth);
			assert_eq!(&*img, &[last]);
			let pal = img.palette().unwrap();
			assert_eq!(pal.len(), len);
			assert_eq!(pal.hival(), len - 1);
			assert_eq!(pal.table(), plte.as_slice());

			let img = ImagePng::decode_checked(&raw, 0).unwrap();
			assert_eq!(img.filter(), Filter::Flate);
			assert_eq!(img.palette().map(Palette::len), Some(len));
		}
	}

	#[test]
	fn t_grey_key() {
		let trns = chunk(b"tRNS", &[0, 7]);
		let raw = png(3, 1, 8, 0, 0, &[trns], &[0, 7, 8, 7]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(&*img, &[7, 8, 7]);
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(&**mask, &[0b0100_0000]);
	}

	#[test]
	fn t_rgb_key() {
		let trns = chunk(b"tRNS", &[0, 1, 0, 2, 0, 3]);
		let raw = png(2, 1, 8, 2, 0, &[trns], &[0, 1, 2, 3, 1, 2, 4]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(&**mask, &[0b0100_0000]);
	}

	#[test]
	fn t_alpha() {
		// Grey + alpha.
		let raw = png(2, 1, 8, 4, 0, &[], &[0, 10, 20, 30, 40]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.component_count(), 1);
		assert_eq!(&*img, &[10, 30]);
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(&**mask, &[20, 40]);

		// RGBA, sixteen bits.
		let raw = png(1, 1, 16, 6, 0, &[], &[0, 1, 0, 2, 0, 3, 0, 4, 0]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(&*img, &[1, 2, 3]);
		let mask = img.transparency().and_then(Transparency::mask).unwrap();
		assert_eq!(&**mask, &[4]);
	}

	#[test]
	fn t_metadata() {
		let mut phys = 3780_u32.to_be_bytes().to_vec();
		phys.extend_from_slice(&3780_u32.to_be_bytes());
		phys.push(1);
		let gama = 45_455_u32.to_be_bytes();

		let raw = png(1, 1, 8, 0, 0, &[chunk(b"pHYs", &phys), chunk(b"gAMA", &gama)], &[0, 0]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!((img.dpi_x(), img.dpi_y()), (96, 96));
		assert!((img.gamma().unwrap() - 2.2).abs() < 0.001);
		assert!(img.chromaticities().is_none());

		// Aspect ratio only.
		let mut phys = 2_u32.to_be_bytes().to_vec();
		phys.extend_from_slice(&1_u32.to_be_bytes());
		phys.push(0);
		let raw = png(1, 1, 8, 0, 0, &[chunk(b"pHYs", &phys), chunk(b"sRGB", &[0])], &[0, 0]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.dpi_x(), 0);
		assert_eq!(img.xy_ratio(), Some(2.0));
		assert_eq!(img.gamma(), Some(2.2));
		assert_eq!(img.chromaticities(), Some(Chromaticities::SRGB));

		// Explicit chromaticities beat the sRGB defaults.
		let chrm: Vec<u8> = [31_270_u32, 32_900, 64_000, 33_000, 30_000, 60_000, 15_000, 7_000]
			.iter()
			.flat_map(|v| v.to_be_bytes())
			.collect();
		let raw = png(1, 1, 8, 0, 0, &[chunk(b"sRGB", &[0]), chunk(b"cHRM", &chrm)], &[0, 0]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert!((img.chromaticities().unwrap().blue_y - 0.07).abs() < 0.0001);

		// An embedded profile.
		let mut profile = vec![0_u8; 128];
		profile[16..20].copy_from_slice(b"GRAY");
		let mut iccp = b"name\0\0".to_vec();
		iccp.extend_from_slice(&flate::deflate(&profile));
		let raw = png(1, 1, 8, 0, 0, &[chunk(b"iCCP", &iccp)], &[0, 0]);
		let img = ImagePng::decode_checked(&raw, 0).unwrap();
		assert_eq!(img.icc_profile(), Some(profile.as_slice()));
	}

	#[test]
	fn t_errors() {
		// Unknown filter.
		let raw = png(1, 1, 8, 0, 0, &[], &[9, 0]);
		assert_eq!(
			ImagePng::decode_checked(&raw, FLAG_RAW).unwrap_err(),
			IngestError::Corrupt(ImageKind::Png, "filter type"),
		);

		// Too little data.
		let raw = png(4, 4, 8, 0, 0, &[], &[0, 0]);
		assert_eq!(
			ImagePng::decode_checked(&raw, FLAG_RAW).unwrap_err(),
			IngestError::Eof(ImageKind::Png, "IDAT"),
		);

		// Bad depth.
		let raw = png(1, 1, 4, 2, 0, &[], &[0, 0]);
		assert!(ImagePng::decode_checked(&raw, 0).unwrap_err().is_unsupported());

		// Missing palette.
		let raw = png(1, 1, 8, 3, 0, &[], &[0, 0]);
		assert_eq!(
			ImagePng::decode_checked(&raw, 0).unwrap_err(),
			IngestError::Corrupt(ImageKind::Png, "PLTE"),
		);

		// Not a PNG.
		assert!(matches!(
			ImagePng::decode_checked(b"BM", 0),
			Err(IngestError::Mismatch { .. }),
		));
	}
}
