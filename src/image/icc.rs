/*!
# `Raster Ingest` - Color Metadata
*/



#[derive(Debug, Clone, Copy, PartialEq)]
/// # Chromaticities.
///
/// CIE xy coordinates for the white point and the three primaries.
pub struct Chromaticities {
	/// # White X.
	pub white_x: f32,
	/// # White Y.
	pub white_y: f32,
	/// # Red X.
	pub red_x: f32,
	/// # Red Y.
	pub red_y: f32,
	/// # Green X.
	pub green_x: f32,
	/// # Green Y.
	pub green_y: f32,
	/// # Blue X.
	pub blue_x: f32,
	/// # Blue Y.
	pub blue_y: f32,
}

impl Chromaticities {
	/// # sRGB.
	pub const SRGB: Self = Self {
		white_x: 0.3127,
		white_y: 0.329,
		red_x: 0.64,
		red_y: 0.33,
		green_x: 0.3,
		green_y: 0.6,
		blue_x: 0.15,
		blue_y: 0.06,
	};
}



#[must_use]
/// # ICC Profile Components.
///
/// Read the number of color components described by an ICC profile from its
/// header's data color space signature.
pub(crate) fn icc_components(profile: &[u8]) -> Option<u8> {
	let sig = profile.get(16..20)?;
	match sig {
		b"GRAY" => Some(1),
		b"2CLR" => Some(2),
		b"XYZ " | b"Lab " | b"Luv " | b"YCbr" | b"Yxy " | b"RGB " | b"HSV " |
		b"HLS " | b"CMY " | b"3CLR" => Some(3),
		b"CMYK" | b"4CLR" => Some(4),
		[n, b'C', b'L', b'R'] => match *n {
			b'5'..=b'9' => Some(n - b'0'),
			b'A'..=b'F' => Some(n - b'A' + 10),
			_ => None,
		},
		_ => None,
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	fn profile(sig: &[u8; 4]) -> Vec<u8> {
		let mut out = vec![0_u8; 128];
		out[16..20].copy_from_slice(sig);
		out
	}

	#[test]
	fn t_icc_components() {
		assert_eq!(icc_components(&profile(b"GRAY")), Some(1));
		assert_eq!(icc_components(&profile(b"RGB ")), Some(3));
		assert_eq!(icc_components(&profile(b"Lab ")), Some(3));
		assert_eq!(icc_components(&profile(b"CMYK")), Some(4));
		assert_eq!(icc_components(&profile(b"7CLR")), Some(7));
		assert_eq!(icc_components(&profile(b"FCLR")), Some(15));
		assert_eq!(icc_components(&profile(b"nope")), None);
		assert_eq!(icc_components(&[0; 10]), None);
	}
}
