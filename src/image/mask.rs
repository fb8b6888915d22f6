/*!
# `Raster Ingest` - Transparency
*/

use crate::Image;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Mask Kind.
pub enum MaskKind {
	/// # Stencil.
	///
	/// One bit per pixel; `1` is opaque, `0` is transparent.
	Stencil,
	/// # Soft.
	///
	/// Eight-bit alpha.
	Soft,
}

impl MaskKind {
	#[must_use]
	/// # Bits Per Component.
	pub const fn bpc(self) -> u8 {
		match self {
			Self::Stencil => 1,
			Self::Soft => 8,
		}
	}
}



#[derive(Debug, Clone)]
/// # Transparency.
///
/// An image carries at most one of these.
pub enum Transparency {
	/// # Color Key.
	///
	/// Inclusive `(min, max)` ranges, one per component; any pixel falling
	/// within every range is transparent.
	ColorKey(Vec<(u16, u16)>),

	/// # Mask.
	///
	/// A separate stencil or soft mask image of the same dimensions.
	Mask(Box<Image>),
}

impl Transparency {
	#[must_use]
	/// # Color Key?
	pub fn color_key(&self) -> Option<&[(u16, u16)]> {
		if let Self::ColorKey(k) = self { Some(k) }
		else { None }
	}

	#[must_use]
	/// # Mask?
	pub fn mask(&self) -> Option<&Image> {
		if let Self::Mask(m) = self { Some(m) }
		else { None }
	}
}
