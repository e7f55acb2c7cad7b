//! Numeric tags describing how strip data is stored.
//!
//! The values follow the TIFF registry so metadata taken from a TIFF directory can be passed
//! through unchanged; PSD, PNM and BMP front ends map their own header fields onto the same set.

macro_rules! tags {
    {
        // Permit arbitrary meta items, which include documentation.
        $( #[$enum_attr:meta] )*
        $vis:vis enum $name:ident($ty:tt) $(unknown(#[$unknown_meta:meta] $unknown_doc:ident))* {
            // Each of the `Name = Val,` permitting documentation.
            $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
        }
    } => {
        $( #[$enum_attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        #[non_exhaustive]
        pub enum $name {
            $($(#[$ident_attr])* $tag,)*
            $(
                #[$unknown_meta]
                Unknown($ty),
            )*
        }

        impl $name {
            #[inline(always)]
            pub const fn from_u16(val: u16) -> Option<Self> {
                match val {
                    $( $val => Some($name::$tag), )*
                    _ => None,
                }
            }

            $(
            #[inline(always)]
            pub const fn from_u16_exhaustive($unknown_doc: u16) -> Self {
                match Self::from_u16($unknown_doc) {
                    Some(v) => v,
                    None => $name::Unknown($unknown_doc),
                }
            }
            )*

            #[inline(always)]
            pub const fn to_u16(&self) -> u16 {
                match *self {
                    $( $name::$tag => $val, )*
                    $( $name::Unknown($unknown_doc) => { $unknown_doc }, )*
                }
            }
        }
    };
}

tags! {
/// Compression applied to each strip.
///
/// See [TIFF compression tags](https://www.awaresystems.be/imaging/tiff/tifftags/compression.html)
/// for reference.
pub enum CompressionMethod(u16) unknown(
    /// A compression method without a decoder
    unknown
) {
    None = 1,
    LZW = 5,
    Deflate = 8,
    OldDeflate = 0x80B2,
    PackBits = 0x8005,
    /// Windows bitmap `BI_RLE8`. BMP headers number it 1, which TIFF already uses, so it
    /// carries a code from the private range.
    BmpRle8 = 0xFF01,
    /// Windows bitmap `BI_RLE4`, numbered 2 in BMP headers.
    BmpRle4 = 0xFF02,
}
}

tags! {
/// How stored samples map to colour.
pub enum PhotometricInterpretation(u16) unknown(
    /// An interpretation without a converter
    unknown
) {
    WhiteIsZero = 0,
    BlackIsZero = 1,
    RGB = 2,
    RGBPalette = 3,
    CMYK = 5,
    YCbCr = 6,
}
}

tags! {
/// Whether the channels of a pixel are stored together or as separate planes.
pub enum PlanarConfiguration(u16) {
    /// `[r1, g1, b1, r2, g2, b2, ...]`
    Chunky = 1,
    /// All of channel 0, then all of channel 1, ...
    Planar = 2,
}
}

tags! {
/// Delta encoding applied to the samples of each row.
pub enum Predictor(u16) unknown(
    /// A predictor without a decoder
    unknown
) {
    /// No changes were made to the data
    None = 1,
    /// The images' rows were processed to contain the difference of each pixel from the previous one.
    ///
    /// This means that instead of having in order `[r1, g1. b1, r2, g2 ...]` you will find
    /// `[r1, g1, b1, r2-r1, g2-g1, b2-b1, r3-r2, g3-g2, ...]`
    Horizontal = 2,
    /// Not currently supported
    FloatingPoint = 3,
}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_values_are_kept() {
        assert_eq!(
            CompressionMethod::from_u16_exhaustive(0x8005),
            CompressionMethod::PackBits
        );
        let unknown = CompressionMethod::from_u16_exhaustive(34712);
        assert_eq!(unknown, CompressionMethod::Unknown(34712));
        assert_eq!(unknown.to_u16(), 34712);
        assert_eq!(PlanarConfiguration::from_u16(3), None);
        assert_eq!(CompressionMethod::from_u16(1), Some(CompressionMethod::None));
        assert_eq!(CompressionMethod::BmpRle4.to_u16(), 0xFF02);
        assert_eq!(Predictor::Horizontal.to_u16(), 2);
    }
}
