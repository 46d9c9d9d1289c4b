/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A table-accelerated canonical huffman decoder.
//!
//! The decoder is built from a packed description of per-symbol code
//! lengths; the codes themselves are never transmitted. From the
//! lengths we derive, for every code length `l`:
//!
//! - `base[l]`, the numerically smallest code of that length, and
//! - `offset[l]`, the position of the first id of that length in the
//!   id table,
//!
//! where ids order codes from longest (id 0) to shortest. Both are
//! then "left justified": `base[l]` is shifted into the top of a
//! 64-bit word so the streaming decoder can compare code bounds
//! directly against the raw head of its bit buffer, without shifting
//! per length.
//!
//! Short codes, which make up almost all of a typical stream, resolve
//! through a 2^12 entry lookup table indexed by the top 12 buffer
//! bits. Longer codes fall back to a linear probe over the
//! left-justified bases.

use log::trace;

use crate::bitstream::{StreamBitReader, TableBitReader};
use crate::constants::{
    ENCODING_TABLE_SIZE, LJ_SENTINEL, LONG_ZEROCODE_RUN, MAX_CODE_LEN, SHORTEST_LONG_RUN,
    SHORT_ZEROCODE_RUN, TABLE_LOOKUP_BITS, TABLE_SIZE
};
use crate::errors::HuffmanDecodeErrors;

/// A canonical huffman decoder with a run-length escape, fed by a
/// packed code length table.
///
/// Constructing the decoder consumes the table description and builds
/// the acceleration tables once; [`decode`](FastHufDecoder::decode)
/// may then be called any number of times.
pub struct FastHufDecoder
{
    rle_symbol:      u32,
    num_symbols:     usize,
    min_code_length: u8,
    max_code_length: u8,
    table_bytes:     usize,
    /// dense id -> symbol permutation, ids sorted shortest code ->
    /// largest id
    id_to_symbol: Vec<u32>,
    /// smallest code per length, left-aligned into 64 bits;
    /// `LJ_SENTINEL` for lengths with no codes
    lj_base: [u64; MAX_CODE_LEN + 1],
    /// per-length constant folding the id offset and the base
    /// subtraction into one addend
    lj_offset: [u64; MAX_CODE_LEN + 1],
    /// short-code lookup, indexed by the top `TABLE_LOOKUP_BITS` of
    /// the bit buffer; a zero length marks an unresolvable entry
    table_symbol:   Vec<u16>,
    table_code_len: Vec<u8>,
    /// smallest buffer value the lookup table can resolve
    table_min: u64
}

impl FastHufDecoder
{
    /// Build a decoder from a packed code length table.
    ///
    /// `table` holds the packed description: 6 bits per symbol in
    /// `[min_symbol, max_symbol]`, where values `0..=58` are literal
    /// code lengths (0 meaning the symbol is absent), `59..=62` encode
    /// short runs of absent symbols and `63` a long run with 8 more
    /// bits of run length. Emitting `rle_symbol` during decode repeats
    /// the previously decoded symbol.
    ///
    /// `table` bounds the description; callers typically pass the
    /// whole remainder of their compressed block, since the packed
    /// bits run straight into the payload that follows. The number of
    /// bytes actually consumed is reported by
    /// [`table_bytes_read`](FastHufDecoder::table_bytes_read); the
    /// caller resumes reading its container there.
    pub fn new(
        table: &[u8], min_symbol: usize, max_symbol: usize, rle_symbol: u32
    ) -> Result<FastHufDecoder, HuffmanDecodeErrors>
    {
        if min_symbol > max_symbol || max_symbol >= ENCODING_TABLE_SIZE
        {
            return Err(HuffmanDecodeErrors::InvalidTableSize(min_symbol, max_symbol));
        }

        let mut base = [LJ_SENTINEL; MAX_CODE_LEN + 1];
        let mut offset = [0_u64; MAX_CODE_LEN + 1];
        let mut code_count = [0_usize; MAX_CODE_LEN + 1];

        // (symbol, code length) pairs in the order we find them
        let mut symbols: Vec<(u32, u8)> = Vec::new();

        let mut min_code_length = u8::MAX;
        let mut max_code_length = 0_u8;

        let mut reader = TableBitReader::new(table);
        let mut symbol = min_symbol;

        while symbol <= max_symbol
        {
            if reader.position() >= table.len()
            {
                return Err(HuffmanDecodeErrors::TruncatedTable);
            }

            let code_len = reader.read_bits(6)? as usize;

            if code_len == LONG_ZEROCODE_RUN
            {
                if reader.position() >= table.len()
                {
                    return Err(HuffmanDecodeErrors::TruncatedTable);
                }

                let run_len = reader.read_bits(8)? as usize + SHORTEST_LONG_RUN;

                if symbol + run_len > max_symbol + 1
                {
                    return Err(HuffmanDecodeErrors::RunBeyondEnd);
                }

                symbol += run_len;
            }
            else if code_len >= SHORT_ZEROCODE_RUN
            {
                let run_len = code_len - SHORT_ZEROCODE_RUN + 2;

                if symbol + run_len > max_symbol + 1
                {
                    return Err(HuffmanDecodeErrors::RunBeyondEnd);
                }

                symbol += run_len;
            }
            else
            {
                if code_len != 0
                {
                    symbols.push((symbol as u32, code_len as u8));

                    min_code_length = min_code_length.min(code_len as u8);
                    max_code_length = max_code_length.max(code_len as u8);
                    code_count[code_len] += 1;
                }

                symbol += 1;
            }
        }

        let num_symbols = symbols.len();
        let table_bytes = reader.position();

        let min_len = usize::from(min_code_length);
        let max_len = usize::from(max_code_length);

        // closed form for the smallest code of each length: the total
        // code space claimed by all longer codes, scaled to this
        // length and rounded up
        if num_symbols > 0
        {
            for l in min_len..=max_len
            {
                let mut used: u128 = 0;

                for k in (l + 1)..=max_len
                {
                    used += (code_count[k] as u128) << (max_len - k);
                }

                let scale = 1_u128 << (max_len - l);

                base[l] = ((used + scale - 1) / scale) as u64;
            }

            // first id of each length; ids run longest code -> 0
            offset[max_len] = 0;

            for l in (min_len..max_len).rev()
            {
                offset[l] = offset[l + 1] + code_count[l + 1] as u64;
            }
        }

        // hand out ids per length, in the order symbols were found
        let mut id_to_symbol = vec![0_u32; num_symbols];
        let mut next_id = [u64::MAX; MAX_CODE_LEN + 1];

        if num_symbols > 0
        {
            next_id[min_len..=max_len].copy_from_slice(&offset[min_len..=max_len]);
        }

        for &(sym, len) in &symbols
        {
            let id = &mut next_id[usize::from(len)];

            if *id >= num_symbols as u64
            {
                return Err(HuffmanDecodeErrors::InvalidSymbol);
            }

            id_to_symbol[*id as usize] = sym;
            *id += 1;
        }

        let mut decoder = FastHufDecoder {
            rle_symbol,
            num_symbols,
            min_code_length,
            max_code_length,
            table_bytes,
            id_to_symbol,
            lj_base: [LJ_SENTINEL; MAX_CODE_LEN + 1],
            lj_offset: [0; MAX_CODE_LEN + 1],
            table_symbol: vec![0xFFFF; TABLE_SIZE],
            table_code_len: vec![0; TABLE_SIZE],
            table_min: LJ_SENTINEL
        };

        decoder.build_tables(&base, &offset)?;

        trace!(
            "fast huffman table: {} symbols, code lengths {}..={}",
            num_symbols,
            min_code_length,
            max_code_length
        );

        Ok(decoder)
    }

    /// Number of bytes of table data consumed during construction.
    pub const fn table_bytes_read(&self) -> usize
    {
        self.table_bytes
    }

    /// Build the left-justified base and offset tables and the
    /// short-code acceleration table.
    fn build_tables(
        &mut self, base: &[u64; MAX_CODE_LEN + 1], offset: &[u64; MAX_CODE_LEN + 1]
    ) -> Result<(), HuffmanDecodeErrors>
    {
        for i in 0..=MAX_CODE_LEN
        {
            if base[i] != LJ_SENTINEL
            {
                self.lj_base[i] = base[i] << (64 - i);
            }
            else
            {
                self.lj_base[i] = LJ_SENTINEL;
            }
        }

        // fold the base subtraction into the offset so the decoder
        // computes `id = lj_offset[l] + (buffer >> (64 - l))`
        self.lj_offset[0] = offset[0].wrapping_sub(self.lj_base[0]);

        for i in 1..=MAX_CODE_LEN
        {
            self.lj_offset[i] = offset[i].wrapping_sub(self.lj_base[i] >> (64 - i));
        }

        let min_len = usize::from(self.min_code_length);
        let max_len = usize::from(self.max_code_length);

        for i in 0..TABLE_SIZE
        {
            let value = (i as u64) << (64 - TABLE_LOOKUP_BITS);

            for code_len in min_len..=max_len
            {
                if self.lj_base[code_len] <= value
                {
                    // a hit at a length beyond the lookup width cannot
                    // be resolved from the table bits alone; leave the
                    // entry unresolvable so decode falls back
                    if code_len <= TABLE_LOOKUP_BITS
                    {
                        let id =
                            self.lj_offset[code_len].wrapping_add(value >> (64 - code_len));

                        if id >= self.num_symbols as u64
                        {
                            return Err(HuffmanDecodeErrors::TableOverrun);
                        }

                        self.table_symbol[i] = self.id_to_symbol[id as usize] as u16;
                        self.table_code_len[i] = code_len as u8;
                    }

                    break;
                }
            }
        }

        // smallest buffer value the table can resolve: the base of the
        // longest length the table covers
        let mut min_idx = TABLE_LOOKUP_BITS;

        while min_idx > 0 && self.lj_base[min_idx] == LJ_SENTINEL
        {
            min_idx -= 1;
        }

        self.table_min = self.lj_base[min_idx];

        Ok(())
    }

    /// Decode symbols from `src` until `dst` is full.
    ///
    /// `num_src_bits` is the number of meaningful bits in `src` and
    /// must be at least 128; the first 16 bytes prime the bit buffers
    /// up front. On success every source bit has been consumed and
    /// every element of `dst` written.
    pub fn decode(
        &self, src: &[u8], num_src_bits: usize, dst: &mut [u16]
    ) -> Result<(), HuffmanDecodeErrors>
    {
        if num_src_bits < 128
        {
            return Err(HuffmanDecodeErrors::InsufficientBits(num_src_bits));
        }

        if src.len() * 8 < num_src_bits
        {
            return Err(HuffmanDecodeErrors::Generic(
                "source slice is shorter than the declared bit count"
            ));
        }

        let mut stream = StreamBitReader::new(src, num_src_bits);

        let num_dst_elems = dst.len();
        let mut dst_idx = 0;

        let max_len = usize::from(self.max_code_length);

        while dst_idx < num_dst_elems
        {
            let code_len: u8;
            let symbol: u32;

            if self.table_min <= stream.buffer
            {
                // for invalid bit patterns the table holds a zero
                // length; the decoder then spins on the same spot
                // until the output fills and the terminal accounting
                // reports the stream as bad
                let table_idx = (stream.buffer >> (64 - TABLE_LOOKUP_BITS)) as usize;

                code_len = self.table_code_len[table_idx];
                symbol = u32::from(self.table_symbol[table_idx]);
            }
            else
            {
                // the probe compares against full 64-bit code bounds
                if stream.buffer_bits < 64
                {
                    stream.refill();
                }

                let mut l = TABLE_LOOKUP_BITS + 1;

                while l <= max_len && self.lj_base[l] > stream.buffer
                {
                    l += 1;
                }

                if l > max_len
                {
                    return Err(HuffmanDecodeErrors::InvalidSymbol);
                }

                let id = self.lj_offset[l].wrapping_add(stream.buffer >> (64 - l));

                if id >= self.num_symbols as u64
                {
                    return Err(HuffmanDecodeErrors::InvalidSymbol);
                }

                symbol = self.id_to_symbol[id as usize];
                code_len = l as u8;
            }

            stream.consume(code_len);

            if symbol == self.rle_symbol
            {
                // the run length is the next 8 bits
                if stream.buffer_bits < 8
                {
                    stream.refill();
                }

                let run = (stream.buffer >> 56) as usize;

                if dst_idx == 0
                {
                    return Err(HuffmanDecodeErrors::RleNoPrevious);
                }

                if run == 0
                {
                    return Err(HuffmanDecodeErrors::RleInvalidLength);
                }

                if dst_idx + run > num_dst_elems
                {
                    return Err(HuffmanDecodeErrors::RleOverrun(
                        dst_idx + run,
                        num_dst_elems
                    ));
                }

                let previous = dst[dst_idx - 1];

                dst[dst_idx..dst_idx + run].fill(previous);
                dst_idx += run;

                stream.consume(8);
            }
            else
            {
                dst[dst_idx] = symbol as u16;
                dst_idx += 1;
            }

            if stream.buffer_bits < TABLE_LOOKUP_BITS as i32
            {
                stream.refill();
            }
        }

        let left_over = stream.source_bits_left();

        if left_over != 0
        {
            return Err(HuffmanDecodeErrors::TrailingData(left_over as usize));
        }

        Ok(())
    }
}
