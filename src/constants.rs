/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Longest huffman code length the decoder supports.
///
/// Code length descriptions store lengths in 6 bits, with the values
/// above this reserved for zero-run opcodes.
pub const MAX_CODE_LEN: usize = 58;

/// Number of top bits of the bit buffer used to index the short-code
/// acceleration table.
pub const TABLE_LOOKUP_BITS: usize = 12;

/// Number of entries in the short-code acceleration table.
pub const TABLE_SIZE: usize = 1 << TABLE_LOOKUP_BITS;

/// Marker stored in `lj_base` for code lengths with no codes.
///
/// No left-justified code of a length >= 1 can reach this value, so the
/// `<=` probes reject unused lengths without a separate flag.
pub const LJ_SENTINEL: u64 = u64::MAX;

/// Largest symbol alphabet a code book may describe.
///
/// One entry per 16-bit value plus the run-length escape.
pub const ENCODING_TABLE_SIZE: usize = (1 << 16) + 1;

/// First code-length opcode that encodes a short run of zero lengths.
///
/// Opcodes `59..=62` stand for `2..=5` consecutive symbols with no code.
pub const SHORT_ZEROCODE_RUN: usize = 59;

/// Code-length opcode for a long zero run; followed by 8 bits of
/// extended run length.
pub const LONG_ZEROCODE_RUN: usize = 63;

/// Smallest run length expressible with [`LONG_ZEROCODE_RUN`].
pub const SHORTEST_LONG_RUN: usize = 2 + LONG_ZEROCODE_RUN - SHORT_ZEROCODE_RUN;
