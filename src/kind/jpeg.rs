/*!
# `Raster Ingest` - JPEG Images.

JPEG data is never decoded to pixels; the frame header is read to size and
validate it, and the original bytes are passed through as-is.
*/

use crate::{
	Filter,
	Image,
	image::dpi_round,
	ImageKind,
	IngestError,
	traits::Decoder,
};
use jpeg_decoder::PixelFormat;



/// # JPEG Image.
pub(crate) struct ImageJpeg;

impl Decoder for ImageJpeg {
	const KIND: ImageKind = ImageKind::Jpeg;

	/// # Decode.
	fn decode(raw: &[u8], _flags: u8) -> Result<Image, IngestError> {
		let info = JpegInfo::read(raw, ImageKind::Jpeg)?;
		let mut img = Image::new(
			ImageKind::Jpeg,
			info.width,
			info.height,
			8,
			info.components,
			raw.to_vec(),
			Filter::Dct,
		)?;

		if let Some((x, y)) = info.dpi { img = img.with_dpi(x, y); }
		if info.adobe && info.components == 4 { img = img.with_inverted(); }
		if let Some(icc) = info.icc { img = img.with_icc_profile(icc); }

		Ok(img)
	}
}



#[derive(Debug)]
/// # JPEG Info.
///
/// The handful of things worth knowing about a JPEG stream.
pub(crate) struct JpegInfo {
	/// # Width.
	pub(crate) width: usize,
	/// # Height.
	pub(crate) height: usize,
	/// # Components.
	pub(crate) components: u8,
	/// # DPI.
	pub(crate) dpi: Option<(u32, u32)>,
	/// # Adobe (APP14) Marker?
	pub(crate) adobe: bool,
	/// # ICC Profile.
	pub(crate) icc: Option<Vec<u8>>,
}

impl JpegInfo {
	/// # Read.
	///
	/// Parse the frame header and metadata markers without decoding any scan
	/// data. The `kind` is used for error context since JPEG streams are also
	/// embedded in TIFF files.
	///
	/// ## Errors
	///
	/// Returns an error if the header can't be read, or the pixel format is
	/// one we can't pass through.
	pub(crate) fn read(raw: &[u8], kind: ImageKind) -> Result<Self, IngestError> {
		let mut reader = raw;
		let mut jecoder = jpeg_decoder::Decoder::new(&mut reader);
		jecoder.read_info().map_err(|_| IngestError::Corrupt(kind, "JPEG"))?;
		let info = jecoder.info().ok_or(IngestError::Corrupt(kind, "JPEG"))?;

		let components = match info.pixel_format {
			PixelFormat::L8 => 1,
			PixelFormat::RGB24 => 3,
			PixelFormat::CMYK32 => 4,
			PixelFormat::L16 => return Err(IngestError::Unsupported(kind, "JPEG bit depth")),
		};

		let (dpi, adobe) = scan_markers(raw);

		Ok(Self {
			width: info.width.into(),
			height: info.height.into(),
			components,
			dpi,
			adobe,
			icc: jecoder.icc_profile(),
		})
	}
}

/// # Scan Markers.
///
/// Walk the segments preceding the first scan, picking out the JFIF density
/// and whether or not there's an Adobe marker.
fn scan_markers(raw: &[u8]) -> (Option<(u32, u32)>, bool) {
	let mut dpi = None;
	let mut adobe = false;
	let mut pos = 2;

	while let Some(&[0xFF, marker, hi, lo]) = raw.get(pos..pos + 4) {
		// Start of scan, or the end.
		if marker == 0xDA || marker == 0xD9 { break; }

		let len = usize::from(u16::from_be_bytes([hi, lo]));
		let Some(seg) = raw.get(pos + 4..pos + 2 + len) else { break; };
		match marker {
			// JFIF.
			0xE0 if seg.starts_with(b"JFIF\0") && seg.len() >= 12 => {
				let x = u16::from_be_bytes([seg[8], seg[9]]);
				let y = u16::from_be_bytes([seg[10], seg[11]]);
				dpi = match seg[7] {
					1 => Some((u32::from(x), u32::from(y))),
					2 => Some((
						dpi_round(f64::from(x) * 2.54),
						dpi_round(f64::from(y) * 2.54),
					)),
					_ => dpi,
				};
			},
			// Adobe.
			0xEE if seg.starts_with(b"Adobe") => { adobe = true; },
			_ => {},
		}

		pos += 2 + len;
	}

	(dpi, adobe)
}
