/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! MSB-first bit readers.
//!
//! Two readers live here, one per decoding phase:
//!
//! - [`TableBitReader`] pulls bytes one at a time and serves the small
//!   (6 and 8 bit) reads used while walking a packed code length table.
//! - [`StreamBitReader`] holds a 64-bit primary buffer backed by a
//!   64-bit secondary buffer and serves the streaming symbol decode,
//!   where the decoder compares the raw buffer head against
//!   left-justified code bounds.
//!
//! The underlying byte stream is big endian; 64-bit words are assembled
//! explicitly from bytes so the readers behave the same on any host.

use crate::errors::HuffmanDecodeErrors;

/// Small-buffer reader for packed code length tables.
pub(crate) struct TableBitReader<'src>
{
    src:       &'src [u8],
    position:  usize,
    buffer:    u64,
    bits_left: u8
}

impl<'src> TableBitReader<'src>
{
    pub fn new(src: &'src [u8]) -> TableBitReader<'src>
    {
        TableBitReader {
            src,
            position: 0,
            buffer: 0,
            bits_left: 0
        }
    }

    /// Read the next `count` bits, most significant bit first.
    ///
    /// Bytes are consumed lazily, one at a time; reading past the end
    /// of the table data is an error.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u64, HuffmanDecodeErrors>
    {
        debug_assert!(count <= 8);

        while self.bits_left < count
        {
            let byte = *self
                .src
                .get(self.position)
                .ok_or(HuffmanDecodeErrors::TruncatedTable)?;

            self.buffer = (self.buffer << 8) | u64::from(byte);
            self.position += 1;
            self.bits_left += 8;
        }

        self.bits_left -= count;

        Ok((self.buffer >> self.bits_left) & ((1_u64 << count) - 1))
    }

    /// Number of bytes consumed so far.
    pub const fn position(&self) -> usize
    {
        self.position
    }
}

#[inline(always)]
fn read64(src: &[u8], position: usize) -> u64
{
    let mut buf = [0; 8];

    buf.copy_from_slice(&src[position..position + 8]);

    u64::from_be_bytes(buf)
}

/// Double-buffered reader for the streaming symbol decode.
///
/// The primary buffer is consumed from its most significant end; the
/// decoder shifts it left as codes are recognized. Refills move bits
/// from the top of the secondary buffer into the bottom of the primary
/// one, and reload the secondary buffer from the byte stream in 8-byte
/// big-endian chunks. Once the stream runs dry the secondary buffer is
/// padded with zeroes.
pub(crate) struct StreamBitReader<'src>
{
    src:      &'src [u8],
    position: usize,
    /// declared source bits not yet loaded into either buffer
    bits_left: i64,
    pub buffer:      u64,
    pub buffer_bits: i32,
    back:      u64,
    back_bits: i32
}

impl<'src> StreamBitReader<'src>
{
    /// Create a reader over `src`, of which `num_src_bits` bits are
    /// meaningful.
    ///
    /// The first 16 bytes are loaded into the two buffers up front, so
    /// `num_src_bits` must be at least 128 (the caller checks this).
    pub fn new(src: &'src [u8], num_src_bits: usize) -> StreamBitReader<'src>
    {
        debug_assert!(num_src_bits >= 128 && src.len() >= 16);

        StreamBitReader {
            src,
            position: 16,
            bits_left: num_src_bits as i64 - 128,
            buffer: read64(src, 0),
            buffer_bits: 64,
            back: read64(src, 8),
            back_bits: 64
        }
    }

    /// Declared source bits not yet moved into the buffers.
    pub const fn source_bits_left(&self) -> i64
    {
        self.bits_left
    }

    /// Drop `bits` recognized bits off the top of the primary buffer.
    #[inline(always)]
    pub fn consume(&mut self, bits: u8)
    {
        self.buffer <<= bits;
        self.buffer_bits -= i32::from(bits);
    }

    /// Top the primary buffer back up to 64 valid bits from the
    /// secondary buffer, reloading the secondary buffer from the byte
    /// stream when it drains.
    pub fn refill(&mut self)
    {
        let mut num_bits = 64 - self.buffer_bits;

        debug_assert!(num_bits > 0);

        self.buffer |= self.back >> (64 - num_bits);

        if self.back_bits < num_bits
        {
            num_bits -= self.back_bits;

            if self.bits_left >= 64
            {
                self.back = read64(self.src, self.position);
                self.back_bits = 64;
                self.position += 8;
                self.bits_left -= 64;
            }
            else
            {
                self.back = 0;
                self.back_bits = 64;

                let mut shift = 56_i32;

                while self.bits_left > 0
                {
                    self.back |= u64::from(self.src[self.position]) << shift;

                    self.position += 1;
                    shift -= 8;
                    self.bits_left -= 8;
                }

                // whole-byte subtraction may leave the counter negative
                if self.bits_left < 0
                {
                    self.bits_left = 0;
                }
            }

            self.buffer |= self.back >> (64 - num_bits);
        }

        // shifting a u64 by 64 is not defined, zero the buffer instead
        if self.back_bits <= num_bits
        {
            self.back = 0;
        }
        else
        {
            self.back <<= num_bits;
        }

        self.back_bits -= num_bits;
        self.buffer_bits = 64;
    }
}
