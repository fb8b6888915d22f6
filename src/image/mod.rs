/*!
# `Raster Ingest` - Canonical Image
*/

pub(super) mod color;
pub(super) mod filter;
pub(super) mod icc;
pub(super) mod mask;

use crate::{
	Chromaticities,
	ColorKind,
	codec::{
		buffer_size,
		row_bytes,
	},
	DecodeParms,
	Filter,
	ImageKind,
	IngestError,
	MaskKind,
	Palette,
	Transparency,
};
use std::{
	collections::BTreeMap,
	num::NonZeroUsize,
	ops::Deref,
	sync::atomic::{
		AtomicU64,
		Ordering::Relaxed,
	},
};



/// # Serial.
///
/// Every image gets a unique identifier from this counter.
static SERIAL: AtomicU64 = AtomicU64::new(1);



#[derive(Debug, Clone)]
/// # Image.
///
/// This is the normalized result of decoding any of the supported formats.
///
/// The pixel buffer is either raw samples (packed MSB-first, each row padded
/// to a whole byte) or an encoded stream, as indicated by [`Image::filter`].
/// It can be accessed directly through `Deref` as an `&[u8]`.
///
/// Images are only ever built by the decoders and are immutable once
/// returned.
pub struct Image {
	id: u64,
	kind: ImageKind,
	width: NonZeroUsize,
	height: NonZeroUsize,
	bpc: u8,
	components: u8,
	data: Vec<u8>,
	filter: Filter,
	decode_parms: Option<DecodeParms>,
	palette: Option<Palette>,
	transparency: Option<Transparency>,
	mask: Option<MaskKind>,
	icc_profile: Option<Vec<u8>>,
	gamma: Option<f32>,
	chromaticities: Option<Chromaticities>,
	dpi_x: u32,
	dpi_y: u32,
	xy_ratio: Option<f32>,
	rotation: f32,
	inverted: bool,
	decode: Option<Vec<u8>>,
	attributes: BTreeMap<&'static str, String>,
}

impl Deref for Image {
	type Target = [u8];

	#[inline]
	fn deref(&self) -> &Self::Target { &self.data }
}

/// ## Instantiation.
impl Image {
	/// # New (Encoded).
	///
	/// Create an image whose buffer is held in some encoded form.
	///
	/// ## Errors
	///
	/// Returns an error if either dimension is zero, or the bit depth or
	/// component count is nonsensical.
	pub(crate) fn new(
		kind: ImageKind,
		width: usize,
		height: usize,
		bpc: u8,
		components: u8,
		data: Vec<u8>,
		filter: Filter,
	) -> Result<Self, IngestError> {
		let width = NonZeroUsize::new(width)
			.ok_or(IngestError::Corrupt(kind, "width"))?;
		let height = NonZeroUsize::new(height)
			.ok_or(IngestError::Corrupt(kind, "height"))?;
		if ! matches!(bpc, 1 | 2 | 4 | 8 | 16) {
			return Err(IngestError::Unsupported(kind, "bit depth"));
		}
		if ! (1..=4).contains(&components) {
			return Err(IngestError::Unsupported(kind, "components"));
		}

		Ok(Self {
			id: SERIAL.fetch_add(1, Relaxed),
			kind,
			width,
			height,
			bpc,
			components,
			data,
			filter,
			decode_parms: None,
			palette: None,
			transparency: None,
			mask: None,
			icc_profile: None,
			gamma: None,
			chromaticities: None,
			dpi_x: 0,
			dpi_y: 0,
			xy_ratio: None,
			rotation: 0.0,
			inverted: false,
			decode: None,
			attributes: BTreeMap::new(),
		})
	}

	/// # New (Raw).
	///
	/// Create an image from raw samples, making sure the buffer is exactly
	/// the right size for the dimensions.
	///
	/// ## Errors
	///
	/// In addition to the checks made by [`Image::new`], returns an overflow
	/// error if the buffer length is wrong.
	pub(crate) fn raw(
		kind: ImageKind,
		width: usize,
		height: usize,
		bpc: u8,
		components: u8,
		data: Vec<u8>,
	) -> Result<Self, IngestError> {
		let out = Self::new(kind, width, height, bpc, components, data, Filter::None)?;
		if out.data.len() == out.raw_len()? { Ok(out) }
		else { Err(IngestError::Overflow) }
	}

	/// # New Mask.
	///
	/// Create a stencil (one-bit, `1` = opaque) or soft (eight-bit) mask.
	///
	/// ## Errors
	///
	/// Same as [`Image::raw`].
	pub(crate) fn mask(
		kind: ImageKind,
		width: usize,
		height: usize,
		mask: MaskKind,
		data: Vec<u8>,
	) -> Result<Self, IngestError> {
		let mut out = Self::raw(kind, width, height, mask.bpc(), 1, data)?;
		out.mask = Some(mask);
		Ok(out)
	}

	/// # Expected Raw Length.
	fn raw_len(&self) -> Result<usize, IngestError> {
		let bits = usize::from(self.bpc) * usize::from(self.components);
		buffer_size(row_bytes(self.width.get(), bits)?, self.height.get())
	}
}

/// ## Setters.
impl Image {
	#[must_use]
	/// # With Decode Parameters.
	pub(crate) fn with_decode_parms(mut self, parms: DecodeParms) -> Self {
		self.decode_parms = Some(parms);
		self
	}

	#[must_use]
	/// # With Palette.
	///
	/// Set this before any ICC profile so the profile is checked against the
	/// palette's RGB base rather than the index channel.
	pub(crate) fn with_palette(mut self, palette: Palette) -> Self {
		self.palette = Some(palette);
		self
	}

	#[must_use]
	/// # With Transparency.
	///
	/// This replaces any existing transparency.
	pub(crate) fn with_transparency(mut self, transparency: Transparency) -> Self {
		self.transparency = Some(transparency);
		self
	}

	#[must_use]
	/// # With Mask.
	pub(crate) fn with_mask(self, mask: Self) -> Self {
		self.with_transparency(Transparency::Mask(Box::new(mask)))
	}

	#[must_use]
	/// # With ICC Profile.
	///
	/// The profile is only attached if its component count agrees with the
	/// image's color space. A mismatch is logged, not treated as an error.
	pub(crate) fn with_icc_profile(mut self, profile: Vec<u8>) -> Self {
		let expected = self.color_kind().color_channels();
		match icc::icc_components(&profile) {
			Some(n) if n == expected => { self.icc_profile = Some(profile); },
			Some(n) => {
				log::warn!(
					"{}: ignoring ICC profile with {n} components; expected {expected}.",
					self.kind,
				);
			},
			None => {
				log::warn!("{}: ignoring unreadable ICC profile.", self.kind);
			},
		}
		self
	}

	#[must_use]
	/// # With Gamma.
	pub(crate) fn with_gamma(mut self, gamma: f32) -> Self {
		self.gamma = Some(gamma);
		self
	}

	#[must_use]
	/// # With Chromaticities.
	pub(crate) fn with_chromaticities(mut self, chrm: Chromaticities) -> Self {
		self.chromaticities = Some(chrm);
		self
	}

	#[must_use]
	/// # With DPI.
	pub(crate) fn with_dpi(mut self, x: u32, y: u32) -> Self {
		self.dpi_x = x;
		self.dpi_y = y;
		self
	}

	#[must_use]
	/// # With X/Y Ratio.
	pub(crate) fn with_xy_ratio(mut self, ratio: f32) -> Self {
		self.xy_ratio = Some(ratio);
		self
	}

	#[must_use]
	/// # With Rotation (Radians).
	pub(crate) fn with_rotation(mut self, rotation: f32) -> Self {
		self.rotation = rotation;
		self
	}

	#[must_use]
	/// # With Inverted Decode.
	///
	/// Flag the image as inverted and attach the matching decode array, i.e.
	/// `[1 0]` for each component.
	pub(crate) fn with_inverted(mut self) -> Self {
		self.inverted = true;
		self.decode = Some(
			std::iter::repeat_n([1_u8, 0], usize::from(self.components))
				.flatten()
				.collect()
		);
		self
	}

	#[must_use]
	/// # With Attribute.
	pub(crate) fn with_attribute(mut self, key: &'static str, value: String) -> Self {
		self.attributes.insert(key, value);
		self
	}
}

/// ## Getters.
impl Image {
	#[must_use]
	/// # Attribute.
	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes.get(key).map(String::as_str)
	}

	#[must_use]
	/// # Attributes.
	pub const fn attributes(&self) -> &BTreeMap<&'static str, String> { &self.attributes }

	#[must_use]
	/// # Bits Per Component.
	pub const fn bpc(&self) -> u8 { self.bpc }

	#[must_use]
	/// # Chromaticities.
	pub const fn chromaticities(&self) -> Option<Chromaticities> { self.chromaticities }

	#[must_use]
	/// # Color Kind.
	///
	/// Indexed if there's a palette; otherwise derived from the component
	/// count.
	pub fn color_kind(&self) -> ColorKind {
		if self.palette.is_some() { ColorKind::Indexed }
		else { ColorKind::from_components(self.components).unwrap_or(ColorKind::Grey) }
	}

	#[must_use]
	/// # Component Count.
	///
	/// This is the number of channels, except for stencil masks, which
	/// return `-1`.
	pub fn component_count(&self) -> i32 {
		if self.mask == Some(MaskKind::Stencil) { -1 }
		else { i32::from(self.components) }
	}

	#[must_use]
	/// # Decode Array.
	pub fn decode(&self) -> Option<&[u8]> { self.decode.as_deref() }

	#[must_use]
	/// # Decode Parameters.
	pub const fn decode_parms(&self) -> Option<DecodeParms> { self.decode_parms }

	#[must_use]
	/// # DPI (X).
	///
	/// Zero means unknown.
	pub const fn dpi_x(&self) -> u32 { self.dpi_x }

	#[must_use]
	/// # DPI (Y).
	///
	/// Zero means unknown.
	pub const fn dpi_y(&self) -> u32 { self.dpi_y }

	#[must_use]
	/// # Filter.
	pub const fn filter(&self) -> Filter { self.filter }

	#[must_use]
	/// # Gamma.
	pub const fn gamma(&self) -> Option<f32> { self.gamma }

	#[must_use]
	/// # Height.
	pub const fn height(&self) -> usize { self.height.get() }

	#[must_use]
	/// # ICC Profile.
	pub fn icc_profile(&self) -> Option<&[u8]> { self.icc_profile.as_deref() }

	#[must_use]
	/// # Unique ID.
	pub const fn id(&self) -> u64 { self.id }

	#[must_use]
	/// # Inverted?
	pub const fn inverted(&self) -> bool { self.inverted }

	#[must_use]
	/// # Is Mask?
	pub const fn is_mask(&self) -> bool { self.mask.is_some() }

	#[must_use]
	/// # Source Kind.
	pub const fn kind(&self) -> ImageKind { self.kind }

	#[must_use]
	/// # Mask Kind.
	pub const fn mask_kind(&self) -> Option<MaskKind> { self.mask }

	#[must_use]
	/// # Palette.
	pub const fn palette(&self) -> Option<&Palette> { self.palette.as_ref() }

	#[must_use]
	/// # Rotation (Radians).
	pub const fn rotation(&self) -> f32 { self.rotation }

	#[must_use]
	/// # Transparency.
	pub const fn transparency(&self) -> Option<&Transparency> { self.transparency.as_ref() }

	#[must_use]
	/// # Width.
	pub const fn width(&self) -> usize { self.width.get() }

	#[must_use]
	/// # X/Y Ratio.
	///
	/// This is only set when a source declares a pixel aspect without any
	/// physical unit.
	pub const fn xy_ratio(&self) -> Option<f32> { self.xy_ratio }

	#[must_use]
	/// # Into Data.
	///
	/// Consume the image, returning the pixel buffer.
	pub fn into_data(self) -> Vec<u8> { self.data }
}



/// # DPI From Pixels Per Meter.
pub(crate) fn dpi_from_ppm(ppm: u32) -> u32 {
	dpi_round(f64::from(ppm) * 0.0254)
}

/// # Round DPI.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped.
pub(crate) fn dpi_round(dpi: f64) -> u32 {
	if dpi.is_finite() { dpi.round().clamp(0.0, f64::from(u32::MAX)) as u32 }
	else { 0 }
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_new() {
		let img = Image::raw(ImageKind::Png, 3, 2, 4, 1, vec![0; 4]).unwrap();
		assert_eq!(img.width(), 3);
		assert_eq!(img.height(), 2);
		assert_eq!(img.len(), 4);
		assert_eq!(img.filter(), Filter::None);
		assert_eq!(img.component_count(), 1);
		assert_eq!(img.color_kind(), ColorKind::Grey);

		// Wrong buffer size.
		assert_eq!(
			Image::raw(ImageKind::Png, 3, 2, 4, 1, vec![0; 5]).unwrap_err(),
			IngestError::Overflow,
		);

		// Zero dimensions.
		assert_eq!(
			Image::raw(ImageKind::Bmp, 0, 2, 8, 1, Vec::new()).unwrap_err(),
			IngestError::Corrupt(ImageKind::Bmp, "width"),
		);

		// Bad depth/components.
		assert!(Image::new(ImageKind::Tiff, 1, 1, 3, 1, vec![0], Filter::None).is_err());
		assert!(Image::new(ImageKind::Tiff, 1, 1, 8, 5, vec![0], Filter::None).is_err());
	}

	#[test]
	fn t_ids() {
		let a = Image::raw(ImageKind::Gif, 1, 1, 8, 1, vec![0]).unwrap();
		let b = Image::raw(ImageKind::Gif, 1, 1, 8, 1, vec![0]).unwrap();
		assert_ne!(a.id(), b.id());

		// Also from multiple threads.
		let ids: Vec<u64> = (0..8)
			.map(|_| std::thread::spawn(||
				Image::raw(ImageKind::Gif, 1, 1, 8, 1, vec![0]).unwrap().id()
			))
			.collect::<Vec<_>>()
			.into_iter()
			.map(|h| h.join().unwrap())
			.collect();
		let mut dedup = ids.clone();
		dedup.sort_unstable();
		dedup.dedup();
		assert_eq!(ids.len(), dedup.len());
	}

	#[test]
	fn t_mask() {
		let mask = Image::mask(ImageKind::Png, 9, 1, MaskKind::Stencil, vec![0xFF, 0x80]).unwrap();
		assert_eq!(mask.component_count(), -1);
		assert_eq!(mask.bpc(), 1);
		assert!(mask.is_mask());

		let soft = Image::mask(ImageKind::Png, 2, 1, MaskKind::Soft, vec![0, 255]).unwrap();
		assert_eq!(soft.component_count(), 1);
		assert_eq!(soft.bpc(), 8);

		let img = Image::raw(ImageKind::Png, 2, 1, 8, 3, vec![0; 6]).unwrap()
			.with_mask(soft);
		assert!(img.transparency().and_then(Transparency::mask).is_some());
		assert!(img.transparency().and_then(Transparency::color_key).is_none());
	}

	#[test]
	fn t_icc() {
		let mut profile = vec![0_u8; 128];
		profile[16..20].copy_from_slice(b"RGB ");

		// Match.
		let img = Image::raw(ImageKind::Png, 1, 1, 8, 3, vec![0; 3]).unwrap()
			.with_icc_profile(profile.clone());
		assert!(img.icc_profile().is_some());

		// Mismatch.
		let img = Image::raw(ImageKind::Png, 1, 1, 8, 1, vec![0]).unwrap()
			.with_icc_profile(profile.clone());
		assert!(img.icc_profile().is_none());

		// Indexed images are checked against the RGB base.
		let img = Image::raw(ImageKind::Png, 1, 1, 8, 1, vec![0]).unwrap()
			.with_palette(Palette::grey(8))
			.with_icc_profile(profile);
		assert_eq!(img.color_kind(), ColorKind::Indexed);
		assert!(img.icc_profile().is_some());
	}

	#[test]
	fn t_inverted() {
		let img = Image::raw(ImageKind::Tiff, 1, 1, 8, 3, vec![0; 3]).unwrap()
			.with_inverted();
		assert!(img.inverted());
		assert_eq!(img.decode(), Some(&[1, 0, 1, 0, 1, 0][..]));
	}

	#[test]
	fn t_dpi() {
		assert_eq!(dpi_from_ppm(2835), 72);
		assert_eq!(dpi_from_ppm(3780), 96);
		assert_eq!(dpi_from_ppm(0), 0);
		assert_eq!(dpi_round(f64::NAN), 0);
		assert_eq!(dpi_round(-5.0), 0);
	}
}
