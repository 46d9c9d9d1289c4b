use std::io::{Cursor, Read};

use nanorand::{Rng, WyRand};
use zune_exr::errors::Pxr24Errors;
use zune_exr::float24::float_to_float24;
use zune_exr::header::{Channel, DataWindow, Header, PixelType};
use zune_exr::{CompressorFormat, Pxr24Compressor};

fn reference_inflate(bytes: &[u8]) -> Vec<u8>
{
    let mut writer = Vec::new();

    let mut deflater = flate2::read::ZlibDecoder::new(Cursor::new(bytes));

    deflater.read_to_end(&mut writer).unwrap();

    writer
}

fn uint_pixels(values: &[u32]) -> Vec<u8>
{
    let mut out = Vec::new();

    for value in values
    {
        out.extend_from_slice(&value.to_ne_bytes());
    }

    out
}

fn float_pixels(values: &[f32]) -> Vec<u8>
{
    let mut out = Vec::new();

    for value in values
    {
        out.extend_from_slice(&value.to_ne_bytes());
    }

    out
}

fn half_pixels(bits: &[u16]) -> Vec<u8>
{
    let mut out = Vec::new();

    for value in bits
    {
        out.extend_from_slice(&value.to_ne_bytes());
    }

    out
}

#[test]
fn uint32_single_row_known_answer()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );
    let pixels = uint_pixels(&[1, 2, 2, 100]);

    let mut compressor = Pxr24Compressor::new(&header, pixels.len(), 1).unwrap();

    let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();

    // the deflated payload is the delta stream [1, 1, 0, 98] split
    // into four byte planes, most significant plane first
    let transposed = reference_inflate(&compressed);

    assert_eq!(
        transposed,
        vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 98]
    );

    let restored = compressor.uncompress(&compressed, 0).unwrap();

    assert_eq!(restored, pixels);
}

#[test]
fn subsampled_channels_round_trip()
{
    // G carries samples only for even rows and even columns
    let header = Header::new(
        vec![
            Channel::new("R", PixelType::Float32, 1, 1),
            Channel::new("G", PixelType::Half16, 2, 2),
        ],
        DataWindow::new(0, 0, 3, 1)
    );

    let row0_floats = [1.0_f32, 3.5, -0.25, 100.375];
    let row1_floats = [7.0_f32, 0.015625, -2.0, 0.1];
    let row0_halves = [0x3C00_u16, 0xC500];

    let mut pixels = Vec::new();

    pixels.extend_from_slice(&float_pixels(&row0_floats));
    pixels.extend_from_slice(&half_pixels(&row0_halves));
    pixels.extend_from_slice(&float_pixels(&row1_floats));

    // widest scanline: four floats plus two halves
    let mut compressor = Pxr24Compressor::new(&header, 20, 2).unwrap();

    let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();
    let restored = compressor.uncompress(&compressed, 0).unwrap();

    assert_eq!(restored.len(), pixels.len());

    // floats come back with their significand rounded to 15 bits
    for (i, &f) in row0_floats.iter().enumerate()
    {
        let bits = u32::from_ne_bytes(restored[i * 4..i * 4 + 4].try_into().unwrap());

        assert_eq!(bits, float_to_float24(f) << 8);
    }

    for (i, &f) in row1_floats.iter().enumerate()
    {
        let at = 20 + i * 4;
        let bits = u32::from_ne_bytes(restored[at..at + 4].try_into().unwrap());

        assert_eq!(bits, float_to_float24(f) << 8);
    }

    // halves are exact
    assert_eq!(&restored[16..20], &half_pixels(&row0_halves)[..]);
}

#[test]
fn integer_and_half_channels_are_lossless()
{
    let header = Header::new(
        vec![
            Channel::new("A", PixelType::Uint32, 1, 1),
            Channel::new("B", PixelType::Half16, 1, 2),
        ],
        DataWindow::new(0, 0, 7, 3)
    );

    // rows 0..=3 of A, rows 0 and 2 of B
    let total = 4 * (8 * 4) + 2 * (8 * 2);
    let mut pixels = vec![0_u8; total];
    let mut rng = WyRand::new_seed(0xDEAD_BEEF);

    rng.fill(&mut pixels);

    let mut compressor = Pxr24Compressor::new(&header, 8 * 4 + 8 * 2, 4).unwrap();

    let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();
    let restored = compressor.uncompress(&compressed, 0).unwrap();

    assert_eq!(restored, pixels);
}

#[test]
fn float_channels_keep_their_top_24_bits()
{
    let header = Header::new(
        vec![Channel::new("Z", PixelType::Float32, 1, 1)],
        DataWindow::new(0, 0, 63, 0)
    );

    let mut values = vec![
        f32::NAN,
        f32::INFINITY,
        f32::NEG_INFINITY,
        f32::MAX,
        -f32::MAX,
        0.0,
        -0.0,
    ];
    let mut rng = WyRand::new_seed(7);

    while values.len() < 64
    {
        values.push(f32::from_bits(rng.generate::<u32>()));
    }

    let pixels = float_pixels(&values);

    let mut compressor = Pxr24Compressor::new(&header, pixels.len(), 1).unwrap();

    let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();
    let restored = compressor.uncompress(&compressed, 0).unwrap();

    for (i, &f) in values.iter().enumerate()
    {
        let bits = u32::from_ne_bytes(restored[i * 4..i * 4 + 4].try_into().unwrap());

        assert_eq!(bits, float_to_float24(f) << 8, "sample {i}");
        assert_eq!(bits & 0xFF, 0, "sample {i} has a dirty low byte");

        let restored_float = f32::from_bits(bits);

        if f.is_nan()
        {
            assert!(restored_float.is_nan());
        }

        if f.is_infinite()
        {
            assert_eq!(restored_float, f);
        }
    }
}

#[test]
fn truncated_compressed_data_is_reported()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );
    let pixels = uint_pixels(&[10, 20, 30, 40]);

    let mut compressor = Pxr24Compressor::new(&header, pixels.len(), 1).unwrap();

    let compressed = compressor.compress(&pixels, 0).unwrap().to_vec();

    let err = compressor
        .uncompress(&compressed[..compressed.len() - 1], 0)
        .unwrap_err();

    assert!(matches!(
        err,
        Pxr24Errors::Inflate(_) | Pxr24Errors::NotEnoughData
    ));
}

#[test]
fn short_scanline_walks_report_left_over_bytes()
{
    // compress two rows, then decompress through a compressor whose
    // data window only covers one; the walk leaves bytes behind
    let two_rows = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 1)
    );
    let one_row = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );

    let pixels = uint_pixels(&[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut writer = Pxr24Compressor::new(&two_rows, 16, 2).unwrap();
    let compressed = writer.compress(&pixels, 0).unwrap().to_vec();

    let mut reader = Pxr24Compressor::new(&one_row, 16, 2).unwrap();

    assert!(matches!(
        reader.uncompress(&compressed, 0),
        Err(Pxr24Errors::TooMuchData)
    ));
}

#[test]
fn long_scanline_walks_report_missing_bytes()
{
    // compress one row, then decompress through a compressor whose
    // data window expects two
    let one_row = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );
    let two_rows = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 1)
    );

    let pixels = uint_pixels(&[1, 2, 3, 4]);

    let mut writer = Pxr24Compressor::new(&one_row, 16, 1).unwrap();
    let compressed = writer.compress(&pixels, 0).unwrap().to_vec();

    let mut reader = Pxr24Compressor::new(&two_rows, 16, 2).unwrap();

    assert!(matches!(
        reader.uncompress(&compressed, 0),
        Err(Pxr24Errors::NotEnoughData)
    ));
}

#[test]
fn negative_window_coordinates_round_trip()
{
    let header = Header::new(
        vec![
            Channel::new("A", PixelType::Uint32, 1, 1),
            Channel::new("B", PixelType::Half16, 1, 2),
        ],
        DataWindow::new(-2, -1, 1, 0)
    );

    // rows -1 and 0 of A, row 0 of B (row -1 is not divisible by 2)
    let mut pixels = Vec::new();

    pixels.extend_from_slice(&uint_pixels(&[5, 4, 3, 2]));
    pixels.extend_from_slice(&uint_pixels(&[9, 9, 9, 1]));
    pixels.extend_from_slice(&half_pixels(&[1, 2, 3, 0xFFFF]));

    let mut compressor = Pxr24Compressor::new(&header, 4 * 4 + 4 * 2, 2).unwrap();

    let compressed = compressor.compress(&pixels, -1).unwrap().to_vec();
    let restored = compressor.uncompress(&compressed, -1).unwrap();

    assert_eq!(restored, pixels);
}

#[test]
fn empty_input_stays_empty()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );

    let mut compressor = Pxr24Compressor::new(&header, 16, 1).unwrap();

    assert!(compressor.compress(&[], 0).unwrap().is_empty());
    assert!(compressor.uncompress(&[], 0).unwrap().is_empty());
}

#[test]
fn compressor_reports_its_geometry()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Half16, 1, 1)],
        DataWindow::new(0, 0, 15, 15)
    );

    let compressor = Pxr24Compressor::new(&header, 32, 16).unwrap();

    assert_eq!(compressor.num_scan_lines(), 16);
    assert_eq!(compressor.format(), CompressorFormat::Native);
}

#[test]
fn scratch_buffer_sizes_are_overflow_checked()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );

    assert!(matches!(
        Pxr24Compressor::new(&header, usize::MAX, 2),
        Err(Pxr24Errors::SizeOverflow)
    ));
}

#[test]
fn short_input_buffers_are_reported()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 1, 1)],
        DataWindow::new(0, 0, 3, 0)
    );
    let pixels = uint_pixels(&[1, 2, 2, 100]);

    let mut compressor = Pxr24Compressor::new(&header, pixels.len(), 1).unwrap();

    assert!(matches!(
        compressor.compress(&pixels[..8], 0),
        Err(Pxr24Errors::TooSmallInput(16, 8))
    ));
}

#[test]
fn zero_sampling_factors_are_rejected()
{
    let header = Header::new(
        vec![Channel::new("R", PixelType::Uint32, 0, 1)],
        DataWindow::new(0, 0, 3, 0)
    );

    assert!(matches!(
        Pxr24Compressor::new(&header, 16, 1),
        Err(Pxr24Errors::Generic(_))
    ));
}
