//! Strip based decoding and encoding of raster pixel data
//!
//! Container formats such as TIFF, PSD, PNM and BMP store their pixels as strips: blocks of rows
//! that are compressed independently and hold tightly packed channel samples. This crate turns
//! such strips into a raster of packed ARGB pixels and writes rasters back out.
//!
//! Decoding runs through a fixed pipeline for every pixel:
//!
//! 1. the strip is decompressed ([`decoder::decompress`]),
//! 2. the samples of one pixel are read bit by bit ([`decoder::SampleExtractor`]),
//! 3. horizontal differencing is undone ([`decoder::PredictorState`]),
//! 4. the samples are mapped to ARGB ([`decoder::PhotometricInterpreter`]).
//!
//! The container specific metadata (dimensions, strip offsets, sample layout) is supplied by
//! the caller through a [`decoder::ImageLayout`].
//!
//! ```
//! use std::io::Cursor;
//! use pixel_strips::decoder::{Decoder, ImageLayout};
//! use pixel_strips::tags::PhotometricInterpretation;
//!
//! // A 2x2 bitmap where a set bit is black.
//! let data = vec![0b1000_0000, 0b0100_0000];
//! let layout = ImageLayout::new(2, 2, vec![1], PhotometricInterpretation::WhiteIsZero)
//!     .with_strip_ranges(2, &[(0, 2)]);
//!
//! let raster = Decoder::new(Cursor::new(data)).read_raster(&layout).unwrap();
//! assert_eq!(raster.pixel(0, 0), Some(0xFF000000));
//! assert_eq!(raster.pixel(1, 0), Some(0xFFFFFFFF));
//! ```

pub mod decoder;
pub mod encoder;
mod error;
pub mod raster;
pub mod tags;

pub use self::error::{DecodeError, DecodeResult};
pub use self::raster::Raster;
