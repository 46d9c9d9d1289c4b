/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Error types returned by the huffman decoder and the Pxr24 codec

use std::fmt::{Debug, Formatter};

use zune_inflate::errors::InflateDecodeErrors;

/// Errors possible when constructing a huffman decoder from a packed
/// code length table, or when decoding a huffman bitstream.
pub enum HuffmanDecodeErrors
{
    /// The packed code length description ended before every symbol in
    /// the declared range was described
    TruncatedTable,
    /// A zero-length run in the code length description went past the
    /// last symbol of the alphabet
    RunBeyondEnd,
    /// A decoded id fell outside the code book, or no code length
    /// matched the bit pattern at the stream head
    InvalidSymbol,
    /// Acceleration table construction derived an id outside the code
    /// book
    TableOverrun,
    /// The declared symbol range is empty or exceeds the largest
    /// supported alphabet; fields are the declared min and max symbol
    InvalidTableSize(usize, usize),
    /// Streaming decode needs at least 128 source bits to start;
    /// field is the number of bits found
    InsufficientBits(usize),
    /// Compressed bits remained after the output buffer was filled;
    /// field is the number of bits left over
    TrailingData(usize),
    /// A run-length escape appeared before any symbol was emitted
    RleNoPrevious,
    /// A run-length escape carried a run length of zero
    RleInvalidLength,
    /// A run-length escape would write past the end of the output
    /// buffer; fields are the required and available element counts
    RleOverrun(usize, usize),
    /// Anything else
    Generic(&'static str)
}

impl Debug for HuffmanDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::TruncatedTable =>
            {
                writeln!(f, "Error decoding huffman table, truncated table data")
            }
            Self::RunBeyondEnd =>
            {
                writeln!(f, "Error decoding huffman table, zero run goes beyond the end of the table")
            }
            Self::InvalidSymbol =>
            {
                writeln!(f, "Huffman decode error, decoded an invalid symbol")
            }
            Self::TableOverrun =>
            {
                writeln!(f, "Huffman decode error, acceleration table overrun")
            }
            Self::InvalidTableSize(min, max) =>
            {
                writeln!(f, "Invalid symbol range {min}..={max} for huffman table")
            }
            Self::InsufficientBits(found) =>
            {
                writeln!(f, "Insufficient number of bits for huffman decoding, expected at least 128 but found {found}")
            }
            Self::TrailingData(bits) =>
            {
                writeln!(f, "Compressed data remains after filling expected output buffer, {bits} bits left over")
            }
            Self::RleNoPrevious =>
            {
                writeln!(f, "Huffman decode error, run-length code with no previous symbol")
            }
            Self::RleInvalidLength =>
            {
                writeln!(f, "Huffman decode error, invalid run-length code length")
            }
            Self::RleOverrun(required, capacity) =>
            {
                writeln!(f, "Huffman decode error, symbol run needs {required} output elements but only {capacity} exist")
            }
            Self::Generic(reason) =>
            {
                writeln!(f, "{reason}")
            }
        }
    }
}

impl From<&'static str> for HuffmanDecodeErrors
{
    fn from(reason: &'static str) -> Self
    {
        Self::Generic(reason)
    }
}

/// Errors possible when compressing or decompressing a Pxr24 scanline
/// block.
pub enum Pxr24Errors
{
    /// Scratch buffer sizes overflowed `usize` at construction
    SizeOverflow,
    /// The underlying zlib compressor reported an error
    Deflate(std::io::Error),
    /// The underlying zlib decompressor reported an error
    Inflate(InflateDecodeErrors),
    /// The inflated data ended before the scanline walk was complete
    NotEnoughData,
    /// Inflated bytes remained after the scanline walk was complete
    TooMuchData,
    /// The input buffer is shorter than the scanline range requires;
    /// fields are the required and found byte counts
    TooSmallInput(usize, usize),
    /// Anything else
    Generic(&'static str)
}

impl Debug for Pxr24Errors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::SizeOverflow =>
            {
                writeln!(f, "Scanline block sizes overflow a usize")
            }
            Self::Deflate(err) =>
            {
                writeln!(f, "Data compression (zlib) failed: {err}")
            }
            Self::Inflate(err) =>
            {
                writeln!(f, "Data decompression (zlib) failed: {err:?}")
            }
            Self::NotEnoughData =>
            {
                writeln!(f, "Error decompressing data, input data are shorter than expected")
            }
            Self::TooMuchData =>
            {
                writeln!(f, "Error decompressing data, input data are longer than expected")
            }
            Self::TooSmallInput(expected, found) =>
            {
                writeln!(f, "Too small of an input buffer, expected at least {expected} bytes but found {found}")
            }
            Self::Generic(reason) =>
            {
                writeln!(f, "{reason}")
            }
        }
    }
}

impl From<&'static str> for Pxr24Errors
{
    fn from(reason: &'static str) -> Self
    {
        Self::Generic(reason)
    }
}

impl From<InflateDecodeErrors> for Pxr24Errors
{
    fn from(err: InflateDecodeErrors) -> Self
    {
        Self::Inflate(err)
    }
}
