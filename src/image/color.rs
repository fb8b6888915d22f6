/*!
# `Raster Ingest` - Color
*/

use rgb::{
	ComponentSlice,
	FromSlice,
	RGB8,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Color Space.
///
/// The color model of an image's samples, as a consumer would describe it.
pub enum ColorKind {
	/// # Greyscale.
	Grey,
	/// # RGB.
	Rgb,
	/// # CMYK.
	Cmyk,
	/// # Indexed (RGB Base).
	Indexed,
}

impl ColorKind {
	#[must_use]
	/// # From Components.
	///
	/// Return the (non-indexed) color kind for a given component count.
	pub const fn from_components(components: u8) -> Option<Self> {
		match components {
			1 => Some(Self::Grey),
			3 => Some(Self::Rgb),
			4 => Some(Self::Cmyk),
			_ => None,
		}
	}

	#[inline]
	#[must_use]
	/// # Color Channels.
	///
	/// Return the number of channels the color space itself is defined over.
	/// For indexed images, this is the base (RGB) rather than the one index
	/// channel.
	pub const fn color_channels(self) -> u8 {
		match self {
			Self::Grey => 1,
			Self::Rgb | Self::Indexed => 3,
			Self::Cmyk => 4,
		}
	}

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Grey => "DeviceGray",
			Self::Rgb => "DeviceRGB",
			Self::Cmyk => "DeviceCMYK",
			Self::Indexed => "Indexed",
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Palette.
///
/// An ordered table of RGB entries for indexed images.
pub struct Palette(Vec<RGB8>);

impl Palette {
	#[must_use]
	/// # From Raw RGB.
	///
	/// Build a palette from packed `RGBRGB…` bytes. Any trailing partial entry
	/// is ignored. Returns `None` if there are no complete entries.
	pub(crate) fn from_rgb(raw: &[u8]) -> Option<Self> {
		let len = raw.len() - raw.len() % 3;
		if len == 0 { None }
		else { Some(Self(raw[..len].as_rgb().to_vec())) }
	}

	#[must_use]
	/// # From Entries.
	pub(crate) fn from_entries(entries: Vec<RGB8>) -> Option<Self> {
		if entries.is_empty() { None }
		else { Some(Self(entries)) }
	}

	#[must_use]
	/// # Grey Ramp.
	///
	/// Build an evenly-spaced black-to-white ramp with `1 << bits` entries.
	pub(crate) fn grey(bits: u8) -> Self {
		let bits = bits.clamp(1, 8);
		let max = (1_u16 << bits) - 1;
		Self(
			(0..=max).map(|i| {
				let v = u8::try_from(i * 255 / max).unwrap_or(u8::MAX);
				RGB8::new(v, v, v)
			})
			.collect()
		)
	}

	/// # Pad.
	///
	/// Extend the table with black entries until it has `len` of them.
	pub(crate) fn pad(&mut self, len: usize) {
		if self.0.len() < len { self.0.resize(len, RGB8::new(0, 0, 0)); }
	}
}

/// # Getters.
impl Palette {
	#[must_use]
	/// # Entries.
	pub fn entries(&self) -> &[RGB8] { &self.0 }

	#[must_use]
	/// # Entry.
	pub fn get(&self, idx: usize) -> Option<RGB8> { self.0.get(idx).copied() }

	#[must_use]
	/// # High Index.
	///
	/// Return the largest valid index, i.e. `len - 1`.
	pub fn hival(&self) -> usize { self.0.len().saturating_sub(1) }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Raw Table.
	///
	/// Return the entries as packed `RGBRGB…` bytes.
	pub fn table(&self) -> &[u8] { ComponentSlice::as_slice(self.0.as_slice()) }
}
