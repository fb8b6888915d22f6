/*!
# `Raster Ingest` - Stream Filters
*/



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Filter.
///
/// How an [`Image`](crate::Image)'s pixel buffer is encoded.
pub enum Filter {
	#[default]
	/// # Raw Samples.
	None,
	/// # Zlib/Deflate.
	Flate,
	/// # CCITT Fax.
	CcittFax,
	/// # JPEG.
	Dct,
}

impl Filter {
	#[must_use]
	/// # As Str.
	///
	/// Return the conventional filter name, or an empty string for raw data.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::None => "",
			Self::Flate => "FlateDecode",
			Self::CcittFax => "CCITTFaxDecode",
			Self::Dct => "DCTDecode",
		}
	}

	#[must_use]
	/// # Is Raw?
	pub const fn is_raw(self) -> bool { matches!(self, Self::None) }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Decode Parameters.
///
/// Whatever a consumer needs, beyond the filter itself, to undo the encoding.
pub enum DecodeParms {
	/// # Flate Predictor.
	Flate {
		/// # Predictor.
		predictor: u8,
		/// # Colors (Samples Per Pixel).
		colors: u8,
		/// # Bits Per Component.
		bpc: u8,
		/// # Columns.
		columns: u32,
	},

	/// # Fax.
	Fax {
		/// # K (<0: G4, 0: G3 1-D, >0: G3 2-D).
		k: i32,
		/// # Columns.
		columns: u32,
		/// # Rows.
		rows: u32,
		/// # Black is 1?
		black_is_1: bool,
		/// # Byte-Aligned Rows?
		byte_align: bool,
	},
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_filter() {
		assert_eq!(Filter::default(), Filter::None);
		assert!(Filter::None.is_raw());
		assert!(! Filter::Flate.is_raw());
		assert_eq!(Filter::CcittFax.as_str(), "CCITTFaxDecode");
		assert_eq!(Filter::Dct.as_str(), "DCTDecode");
	}
}
