/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The Pxr24 scanline compressor.
//!
//! The compressor preprocesses pixel data to reduce entropy and hands
//! the result to zlib. Every sample is first mapped to an unsigned
//! integer: Uint32 as-is, Half16 reinterpreted as its raw 16 bits,
//! Float32 squeezed to 24 bits (see [`crate::float24`], the one lossy
//! step). Each value is then replaced by the difference to its left
//! neighbour, which turns flat image regions into runs of zeroes, and
//! the difference bytes are transposed into per-significance planes,
//! most significant bytes first, so the byte-level compressor sees
//! long uniform runs.
//!
//! Compression of Half16 and Uint32 channels is lossless; Float32
//! channels lose the bottom 8 significand bits.

use log::trace;

use crate::errors::Pxr24Errors;
use crate::float24::float_to_float24;
use crate::header::{num_samples, Channel, DataWindow, Header, PixelType};
use crate::zlib;

/// Pixel layout a compressor expects its input in and produces its
/// output in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompressorFormat
{
    /// Samples in native machine layout
    Native,
    /// Samples in the big-endian wire layout
    Xdr
}

/// Compressor and decompressor for blocks of Pxr24 scanlines.
///
/// One instance serves one image; it owns scratch buffers sized for
/// the worst case block at construction time, and back to back calls
/// are independent of each other. Compressed blocks are single zlib
/// streams over the transposed difference bytes.
pub struct Pxr24Compressor
{
    channels:       Vec<Channel>,
    min_x:          i32,
    max_x:          i32,
    max_y:          i32,
    num_scan_lines: usize,
    max_in_bytes:   usize,
    tmp_buffer:     Vec<u8>,
    out_buffer:     Vec<u8>
}

impl Pxr24Compressor
{
    /// Create a compressor for an image.
    ///
    /// `max_scan_line_bytes` is the byte size of the widest possible
    /// scanline, `num_scan_lines` the number of rows in one
    /// compression block.
    pub fn new(
        header: &Header, max_scan_line_bytes: usize, num_scan_lines: usize
    ) -> Result<Pxr24Compressor, Pxr24Errors>
    {
        let max_in_bytes = max_scan_line_bytes
            .checked_mul(num_scan_lines)
            .ok_or(Pxr24Errors::SizeOverflow)?;

        // worst case zlib growth plus a fixed header allowance
        let slack = max_in_bytes / 100 + usize::from(max_in_bytes % 100 != 0);
        let max_out_bytes = max_in_bytes
            .checked_add(slack)
            .and_then(|v| v.checked_add(100))
            .ok_or(Pxr24Errors::SizeOverflow)?;

        for channel in header.channels()
        {
            if channel.x_sampling < 1 || channel.y_sampling < 1
            {
                return Err(Pxr24Errors::Generic(
                    "channel sampling factors must be at least 1"
                ));
            }
        }

        let data_window = header.data_window();

        Ok(Pxr24Compressor {
            channels: header.channels().to_vec(),
            min_x: data_window.min_x,
            max_x: data_window.max_x,
            max_y: data_window.max_y,
            num_scan_lines,
            max_in_bytes,
            tmp_buffer: vec![0; max_in_bytes],
            out_buffer: Vec::with_capacity(max_out_bytes)
        })
    }

    /// Number of scanlines per compression block.
    pub const fn num_scan_lines(&self) -> usize
    {
        self.num_scan_lines
    }

    /// The pixel layout this compressor works in.
    ///
    /// Always [`CompressorFormat::Native`]; samples are consumed and
    /// produced exactly as laid out by the caller, without endianness
    /// normalization.
    pub const fn format(&self) -> CompressorFormat
    {
        CompressorFormat::Native
    }

    /// Compress one block of scanlines starting at row `min_y`.
    ///
    /// Returns the compressed bytes, valid until the next call.
    pub fn compress(&mut self, data: &[u8], min_y: i32) -> Result<&[u8], Pxr24Errors>
    {
        let range = DataWindow::new(
            self.min_x,
            min_y,
            self.max_x,
            min_y + self.num_scan_lines as i32 - 1
        );

        self.compress_range(data, range)
    }

    /// Compress the pixel data of an arbitrary coordinate range, e.g.
    /// one tile.
    pub fn compress_range(&mut self, data: &[u8], range: DataWindow)
        -> Result<&[u8], Pxr24Errors>
    {
        if data.is_empty()
        {
            return Ok(&[]);
        }

        let min_x = range.min_x;
        let max_x = range.max_x.min(self.max_x);
        let min_y = range.min_y;
        let max_y = range.max_y.min(self.max_y);

        let mut tmp_end = 0;
        let mut in_pos = 0;

        for y in min_y..=max_y
        {
            for channel in &self.channels
            {
                if y.rem_euclid(channel.y_sampling) != 0
                {
                    continue;
                }

                let n = num_samples(channel.x_sampling, min_x, max_x);
                let sample_bytes = n * channel.pixel_type.size_of();
                // a Float32 difference only spreads into 3 planes, the
                // truncated low byte is never emitted
                let plane_bytes = n * num_planes(channel.pixel_type);

                let src = data
                    .get(in_pos..in_pos + sample_bytes)
                    .ok_or(Pxr24Errors::TooSmallInput(in_pos + sample_bytes, data.len()))?;

                in_pos += sample_bytes;

                if tmp_end + plane_bytes > self.tmp_buffer.len()
                {
                    return Err(Pxr24Errors::Generic(
                        "scanline range does not fit the scratch buffer"
                    ));
                }

                let planes = &mut self.tmp_buffer[tmp_end..tmp_end + plane_bytes];
                let mut previous = 0_u32;

                match channel.pixel_type
                {
                    PixelType::Uint32 =>
                    {
                        for (j, sample) in src.chunks_exact(4).enumerate()
                        {
                            let pixel = u32::from_ne_bytes(sample.try_into().unwrap());
                            let diff = pixel.wrapping_sub(previous);

                            previous = pixel;

                            planes[j] = (diff >> 24) as u8;
                            planes[n + j] = (diff >> 16) as u8;
                            planes[2 * n + j] = (diff >> 8) as u8;
                            planes[3 * n + j] = diff as u8;
                        }
                    }
                    PixelType::Half16 =>
                    {
                        for (j, sample) in src.chunks_exact(2).enumerate()
                        {
                            let pixel =
                                u32::from(u16::from_ne_bytes(sample.try_into().unwrap()));
                            let diff = pixel.wrapping_sub(previous);

                            previous = pixel;

                            planes[j] = (diff >> 8) as u8;
                            planes[n + j] = diff as u8;
                        }
                    }
                    PixelType::Float32 =>
                    {
                        for (j, sample) in src.chunks_exact(4).enumerate()
                        {
                            let pixel =
                                float_to_float24(f32::from_ne_bytes(sample.try_into().unwrap()));
                            let diff = pixel.wrapping_sub(previous);

                            previous = pixel;

                            planes[j] = (diff >> 16) as u8;
                            planes[n + j] = (diff >> 8) as u8;
                            planes[2 * n + j] = diff as u8;
                        }
                    }
                }

                tmp_end += plane_bytes;
            }
        }

        self.out_buffer.clear();

        let written = zlib::compress_into(&self.tmp_buffer[..tmp_end], &mut self.out_buffer)?;

        trace!("pxr24: deflated {tmp_end} transposed bytes into {written}");

        Ok(&self.out_buffer)
    }

    /// Decompress one block of scanlines starting at row `min_y`.
    ///
    /// Returns the reconstructed pixel data, valid until the next
    /// call.
    pub fn uncompress(&mut self, data: &[u8], min_y: i32) -> Result<&[u8], Pxr24Errors>
    {
        let range = DataWindow::new(
            self.min_x,
            min_y,
            self.max_x,
            min_y + self.num_scan_lines as i32 - 1
        );

        self.uncompress_range(data, range)
    }

    /// Decompress the pixel data of an arbitrary coordinate range,
    /// e.g. one tile.
    pub fn uncompress_range(&mut self, data: &[u8], range: DataWindow)
        -> Result<&[u8], Pxr24Errors>
    {
        if data.is_empty()
        {
            return Ok(&[]);
        }

        let tmp = zlib::uncompress(data, self.max_in_bytes)?;
        let tmp_size = tmp.len();

        trace!("pxr24: inflated {} bytes into {tmp_size}", data.len());

        let min_x = range.min_x;
        let max_x = range.max_x.min(self.max_x);
        let min_y = range.min_y;
        let max_y = range.max_y.min(self.max_y);

        let mut tmp_end = 0;

        self.out_buffer.clear();

        for y in min_y..=max_y
        {
            for channel in &self.channels
            {
                if y.rem_euclid(channel.y_sampling) != 0
                {
                    continue;
                }

                let n = num_samples(channel.x_sampling, min_x, max_x);
                let plane_bytes = n * num_planes(channel.pixel_type);

                if tmp_end + plane_bytes > tmp_size
                {
                    return Err(Pxr24Errors::NotEnoughData);
                }

                let planes = &tmp[tmp_end..tmp_end + plane_bytes];
                let mut pixel = 0_u32;

                match channel.pixel_type
                {
                    PixelType::Uint32 =>
                    {
                        for j in 0..n
                        {
                            let diff = (u32::from(planes[j]) << 24)
                                | (u32::from(planes[n + j]) << 16)
                                | (u32::from(planes[2 * n + j]) << 8)
                                | u32::from(planes[3 * n + j]);

                            pixel = pixel.wrapping_add(diff);

                            self.out_buffer.extend_from_slice(&pixel.to_ne_bytes());
                        }
                    }
                    PixelType::Half16 =>
                    {
                        for j in 0..n
                        {
                            let diff =
                                (u32::from(planes[j]) << 8) | u32::from(planes[n + j]);

                            pixel = pixel.wrapping_add(diff);

                            self.out_buffer
                                .extend_from_slice(&(pixel as u16).to_ne_bytes());
                        }
                    }
                    PixelType::Float32 =>
                    {
                        // the three planes carry a 24-bit difference;
                        // accumulating it pre-shifted reconstructs the
                        // 32-bit pattern with a zero low byte directly
                        for j in 0..n
                        {
                            let diff = (u32::from(planes[j]) << 24)
                                | (u32::from(planes[n + j]) << 16)
                                | (u32::from(planes[2 * n + j]) << 8);

                            pixel = pixel.wrapping_add(diff);

                            self.out_buffer.extend_from_slice(&pixel.to_ne_bytes());
                        }
                    }
                }

                tmp_end += plane_bytes;
            }
        }

        if tmp_end < tmp_size
        {
            return Err(Pxr24Errors::TooMuchData);
        }

        Ok(&self.out_buffer)
    }
}

/// Number of difference byte planes one sample of the given type
/// spreads into.
const fn num_planes(pixel_type: PixelType) -> usize
{
    match pixel_type
    {
        PixelType::Uint32 => 4,
        PixelType::Half16 => 2,
        PixelType::Float32 => 3
    }
}
