/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! OpenEXR codec primitives.
//!
//! This crate implements the two entropy-facing pieces of the EXR
//! format that do the heavy lifting, independent of any container
//! parsing:
//!
//! - [`FastHufDecoder`], a table-accelerated canonical huffman decoder
//!   with a run-length escape, built from a packed code length table.
//! - [`Pxr24Compressor`], the lossy-for-float scanline compressor that
//!   delta-codes and byte-transposes samples before handing them to
//!   zlib. Half and integer channels survive a round trip exactly;
//!   float channels keep their top 24 bits.
//!
//! The caller owns file parsing and hands codecs a [`header::Header`]
//! describing the channel list and data window the pixel data was laid
//! out for.
//!
//! # Usage
//!
//! Round-tripping a single scanline of one unsigned integer channel:
//!
//! ```
//! use zune_exr::header::{Channel, DataWindow, Header, PixelType};
//! use zune_exr::Pxr24Compressor;
//!
//! let header = Header::new(
//!     vec![Channel::new("R", PixelType::Uint32, 1, 1)],
//!     DataWindow::new(0, 0, 3, 0)
//! );
//!
//! let mut pixels = Vec::new();
//!
//! for value in [1_u32, 2, 2, 100]
//! {
//!     pixels.extend_from_slice(&value.to_ne_bytes());
//! }
//!
//! let mut compressor = Pxr24Compressor::new(&header, pixels.len(), 1).unwrap();
//!
//! let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();
//! let restored = compressor.uncompress(&compressed, 0).unwrap();
//!
//! assert_eq!(restored, pixels);
//! ```
pub use crate::huffman::FastHufDecoder;
pub use crate::pxr24::{CompressorFormat, Pxr24Compressor};

pub mod errors;
pub mod float24;
pub mod header;

mod bitstream;
mod constants;
mod huffman;
mod pxr24;
mod zlib;
