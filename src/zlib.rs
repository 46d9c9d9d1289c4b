/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Thin adapter over the external zlib codecs.
//!
//! Compression goes through flate2, decompression through
//! zune-inflate with a hard output limit, since the caller always
//! knows the largest size a valid stream may inflate to.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::errors::Pxr24Errors;

/// Compress `src` as a single zlib stream, appending the output to
/// `out`. Returns the number of bytes written.
pub(crate) fn compress_into(src: &[u8], out: &mut Vec<u8>) -> Result<usize, Pxr24Errors>
{
    let start = out.len();

    let mut encoder = ZlibEncoder::new(out, Compression::default());

    encoder.write_all(src).map_err(Pxr24Errors::Deflate)?;

    let out = encoder.finish().map_err(Pxr24Errors::Deflate)?;

    Ok(out.len() - start)
}

/// Inflate a zlib stream, failing if the output would exceed
/// `expected_size` bytes.
pub(crate) fn uncompress(src: &[u8], expected_size: usize) -> Result<Vec<u8>, Pxr24Errors>
{
    let options = DeflateOptions::default()
        .set_limit(expected_size)
        .set_size_hint(expected_size);

    let mut decoder = DeflateDecoder::new_with_options(src, options);

    decoder.decode_zlib().map_err(Pxr24Errors::Inflate)
}
