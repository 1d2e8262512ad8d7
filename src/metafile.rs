//! Minimal EMF and WMF writers.
//!
//! Both formats are written as a metafile holding a single device-independent
//! bitmap stretched over the whole frame: 24 bits per pixel, BGR order,
//! bottom-up rows padded to four bytes. Records are little-endian.

use byteorder::{LittleEndian, WriteBytesExt};
use image::RgbImage;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetafileError {
    #[error("metafile write failed: {0}")]
    Io(#[from] io::Error),
    #[error("{width}x{height} pixels exceeds the 16-bit coordinate range of WMF")]
    TooLarge { width: u32, height: u32 },
}

const BITMAPINFOHEADER_SIZE: u32 = 40;
const SRCCOPY: u32 = 0x00CC_0020;
const DIB_RGB_COLORS: u32 = 0;

const EMR_HEADER: u32 = 1;
const EMR_EOF: u32 = 14;
const EMR_STRETCHDIBITS: u32 = 81;
const EMF_SIGNATURE: u32 = 0x464D_4520;
const EMF_HEADER_SIZE: u32 = 88;
const EMF_STRETCHDIBITS_FIXED: u32 = 80;
const EMF_EOF_SIZE: u32 = 20;

const WMF_PLACEABLE_KEY: u32 = 0x9AC6_CDD7;
const META_SETWINDOWORG: u16 = 0x020B;
const META_SETWINDOWEXT: u16 = 0x020C;
const META_STRETCHDIB: u16 = 0x0F43;
const META_EOF: u16 = 0x0000;
const WMF_HEADER_WORDS: u32 = 9;
const WMF_STRETCHDIB_FIXED: u32 = 28;

/// Packed DIB: BITMAPINFOHEADER followed by the pixel rows.
struct Dib {
    header: Vec<u8>,
    bits: Vec<u8>,
}

impl Dib {
    fn new(image: &RgbImage, dpi: f32) -> io::Result<Self> {
        let (width, height) = image.dimensions();
        let stride = (width as usize * 3 + 3) & !3;
        let pels_per_meter = (dpi / 0.0254).round() as i32;

        let mut bits = Vec::with_capacity(stride * height as usize);
        for y in (0..height).rev() {
            let row_start = bits.len();
            for x in 0..width {
                let [r, g, b] = image.get_pixel(x, y).0;
                bits.extend_from_slice(&[b, g, r]);
            }
            bits.resize(row_start + stride, 0);
        }

        let mut header = Vec::with_capacity(BITMAPINFOHEADER_SIZE as usize);
        header.write_u32::<LittleEndian>(BITMAPINFOHEADER_SIZE)?;
        header.write_i32::<LittleEndian>(width as i32)?;
        header.write_i32::<LittleEndian>(height as i32)?;
        header.write_u16::<LittleEndian>(1)?; // planes
        header.write_u16::<LittleEndian>(24)?;
        header.write_u32::<LittleEndian>(0)?; // BI_RGB
        header.write_u32::<LittleEndian>(bits.len() as u32)?;
        header.write_i32::<LittleEndian>(pels_per_meter)?;
        header.write_i32::<LittleEndian>(pels_per_meter)?;
        header.write_u32::<LittleEndian>(0)?;
        header.write_u32::<LittleEndian>(0)?;

        Ok(Self { header, bits })
    }

    fn len(&self) -> u32 {
        (self.header.len() + self.bits.len()) as u32
    }
}

/// Write `image` as an enhanced metafile.
pub fn write_emf(image: &RgbImage, dpi: f32, out: &mut impl Write) -> Result<(), MetafileError> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as i32, height as i32);
    let dib = Dib::new(image, dpi)?;

    let stretch_size = EMF_STRETCHDIBITS_FIXED + dib.len();
    let total_size = EMF_HEADER_SIZE + stretch_size + EMF_EOF_SIZE;
    let frame_w = hundredths_of_mm(width, dpi);
    let frame_h = hundredths_of_mm(height, dpi);

    let mut buf = Vec::with_capacity(total_size as usize);

    // EMR_HEADER
    buf.write_u32::<LittleEndian>(EMR_HEADER)?;
    buf.write_u32::<LittleEndian>(EMF_HEADER_SIZE)?;
    write_rect(&mut buf, 0, 0, w - 1, h - 1)?;
    write_rect(&mut buf, 0, 0, frame_w - 1, frame_h - 1)?;
    buf.write_u32::<LittleEndian>(EMF_SIGNATURE)?;
    buf.write_u32::<LittleEndian>(0x0001_0000)?;
    buf.write_u32::<LittleEndian>(total_size)?;
    buf.write_u32::<LittleEndian>(3)?; // records
    buf.write_u16::<LittleEndian>(1)?; // handles, slot 0 is reserved
    buf.write_u16::<LittleEndian>(0)?;
    buf.write_u32::<LittleEndian>(0)?; // description length
    buf.write_u32::<LittleEndian>(0)?; // description offset
    buf.write_u32::<LittleEndian>(0)?; // palette entries
    buf.write_i32::<LittleEndian>(w)?;
    buf.write_i32::<LittleEndian>(h)?;
    buf.write_i32::<LittleEndian>((frame_w / 100).max(1))?;
    buf.write_i32::<LittleEndian>((frame_h / 100).max(1))?;

    // EMR_STRETCHDIBITS
    buf.write_u32::<LittleEndian>(EMR_STRETCHDIBITS)?;
    buf.write_u32::<LittleEndian>(stretch_size)?;
    write_rect(&mut buf, 0, 0, w - 1, h - 1)?;
    for v in [0, 0, 0, 0, w, h] {
        buf.write_i32::<LittleEndian>(v)?;
    }
    buf.write_u32::<LittleEndian>(EMF_STRETCHDIBITS_FIXED)?;
    buf.write_u32::<LittleEndian>(BITMAPINFOHEADER_SIZE)?;
    buf.write_u32::<LittleEndian>(EMF_STRETCHDIBITS_FIXED + BITMAPINFOHEADER_SIZE)?;
    buf.write_u32::<LittleEndian>(dib.bits.len() as u32)?;
    buf.write_u32::<LittleEndian>(DIB_RGB_COLORS)?;
    buf.write_u32::<LittleEndian>(SRCCOPY)?;
    buf.write_i32::<LittleEndian>(w)?;
    buf.write_i32::<LittleEndian>(h)?;
    buf.extend_from_slice(&dib.header);
    buf.extend_from_slice(&dib.bits);

    // EMR_EOF
    buf.write_u32::<LittleEndian>(EMR_EOF)?;
    buf.write_u32::<LittleEndian>(EMF_EOF_SIZE)?;
    buf.write_u32::<LittleEndian>(0)?;
    buf.write_u32::<LittleEndian>(16)?;
    buf.write_u32::<LittleEndian>(EMF_EOF_SIZE)?;

    out.write_all(&buf)?;
    Ok(())
}

/// Write `image` as a placeable Windows metafile.
pub fn write_wmf(image: &RgbImage, dpi: f32, out: &mut impl Write) -> Result<(), MetafileError> {
    let (width, height) = image.dimensions();
    let too_large = || MetafileError::TooLarge { width, height };
    let w = i16::try_from(width).map_err(|_| too_large())?;
    let h = i16::try_from(height).map_err(|_| too_large())?;
    let dib = Dib::new(image, dpi)?;

    let stretch_words = (WMF_STRETCHDIB_FIXED + dib.len()) / 2;
    let total_words = WMF_HEADER_WORDS + 5 + 5 + stretch_words + 3;

    let mut buf = Vec::with_capacity(22 + total_words as usize * 2);

    // Placeable header, checksum is the XOR of the ten words before it.
    let mut placeable = Vec::with_capacity(20);
    placeable.write_u32::<LittleEndian>(WMF_PLACEABLE_KEY)?;
    placeable.write_u16::<LittleEndian>(0)?;
    for v in [0, 0, w, h] {
        placeable.write_i16::<LittleEndian>(v)?;
    }
    placeable.write_u16::<LittleEndian>(dpi.round().clamp(1.0, f32::from(u16::MAX)) as u16)?;
    placeable.write_u32::<LittleEndian>(0)?;
    let checksum = placeable
        .chunks_exact(2)
        .fold(0u16, |acc, word| acc ^ u16::from_le_bytes([word[0], word[1]]));
    buf.extend_from_slice(&placeable);
    buf.write_u16::<LittleEndian>(checksum)?;

    // META_HEADER
    buf.write_u16::<LittleEndian>(1)?;
    buf.write_u16::<LittleEndian>(WMF_HEADER_WORDS as u16)?;
    buf.write_u16::<LittleEndian>(0x0300)?;
    buf.write_u32::<LittleEndian>(total_words)?;
    buf.write_u16::<LittleEndian>(0)?; // objects
    buf.write_u32::<LittleEndian>(stretch_words)?;
    buf.write_u16::<LittleEndian>(0)?;

    write_wmf_record(&mut buf, META_SETWINDOWORG, &[0, 0])?;
    write_wmf_record(&mut buf, META_SETWINDOWEXT, &[h, w])?;

    // META_STRETCHDIB
    buf.write_u32::<LittleEndian>(stretch_words)?;
    buf.write_u16::<LittleEndian>(META_STRETCHDIB)?;
    buf.write_u32::<LittleEndian>(SRCCOPY)?;
    buf.write_u16::<LittleEndian>(DIB_RGB_COLORS as u16)?;
    for v in [h, w, 0, 0, h, w, 0, 0] {
        buf.write_i16::<LittleEndian>(v)?;
    }
    buf.extend_from_slice(&dib.header);
    buf.extend_from_slice(&dib.bits);

    write_wmf_record(&mut buf, META_EOF, &[])?;

    out.write_all(&buf)?;
    Ok(())
}

fn write_rect(buf: &mut Vec<u8>, left: i32, top: i32, right: i32, bottom: i32) -> io::Result<()> {
    for v in [left, top, right, bottom] {
        buf.write_i32::<LittleEndian>(v)?;
    }
    Ok(())
}

fn write_wmf_record(buf: &mut Vec<u8>, function: u16, params: &[i16]) -> io::Result<()> {
    buf.write_u32::<LittleEndian>(3 + params.len() as u32)?;
    buf.write_u16::<LittleEndian>(function)?;
    for &p in params {
        buf.write_i16::<LittleEndian>(p)?;
    }
    Ok(())
}

fn hundredths_of_mm(pixels: u32, dpi: f32) -> i32 {
    ((pixels as f32 * 2540.0 / dpi).round() as i32).max(1)
}
