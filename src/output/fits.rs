//! Minimal FITS writer: one primary HDU holding a single frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::frame::{Frame, Pixels};

const BLOCK: usize = 2880;
const CARD: usize = 80;
/// Offset mapping unsigned 16-bit samples onto FITS signed integers.
const BZERO_U16: i64 = 32768;

enum Value<'a> {
    Logical(bool),
    Integer(i64),
    Text(&'a str),
}

fn card(keyword: &str, value: Value<'_>, comment: Option<&str>) -> String {
    let value = match value {
        Value::Logical(v) => format!("{:>20}", if v { "T" } else { "F" }),
        Value::Integer(v) => format!("{:>20}", v),
        Value::Text(v) => format!("{:<20}", format!("'{:<8}'", v.replace('\'', "''"))),
    };
    let mut card = format!("{:<8}= {}", keyword, value);
    if let Some(comment) = comment {
        card.push_str(" / ");
        card.push_str(comment);
    }
    card.truncate(CARD);
    format!("{:<80}", card)
}

fn pad_to_block(bytes: &mut Vec<u8>, fill: u8) {
    let rem = bytes.len() % BLOCK;
    if rem != 0 {
        bytes.resize(bytes.len() + BLOCK - rem, fill);
    }
}

/// Header and data of a FITS file holding `frame`.
///
/// Axes are written fastest first: `NAXIS1` is the channel axis for RGB24
/// frames and the width otherwise.
pub fn fits_bytes(frame: &Frame) -> Vec<u8> {
    let mut axes = vec![frame.width as i64, frame.height as i64];
    if frame.channels() == 3 {
        axes.insert(0, 3);
    }

    let bitpix = match frame.pixels {
        Pixels::U8(_) => 8,
        Pixels::U16(_) => 16,
    };

    let mut cards = vec![
        card("SIMPLE", Value::Logical(true), Some("conforms to FITS standard")),
        card("BITPIX", Value::Integer(bitpix), Some("array data type")),
        card("NAXIS", Value::Integer(axes.len() as i64), Some("number of array dimensions")),
    ];
    for (i, len) in axes.iter().enumerate() {
        cards.push(card(&format!("NAXIS{}", i + 1), Value::Integer(*len), None));
    }
    if bitpix == 16 {
        cards.push(card("BZERO", Value::Integer(BZERO_U16), None));
        cards.push(card("BSCALE", Value::Integer(1), None));
    }
    cards.push(card(
        "IMAGETYP",
        Value::Text(&format!("{:?}", frame.image_type).to_uppercase()),
        Some("ASI image type"),
    ));
    cards.push(format!("{:<80}", "END"));

    let mut bytes: Vec<u8> = cards.concat().into_bytes();
    pad_to_block(&mut bytes, b' ');

    match &frame.pixels {
        Pixels::U8(data) => bytes.extend_from_slice(data),
        Pixels::U16(data) => {
            bytes.reserve(data.len() * 2);
            for sample in data {
                bytes.extend_from_slice(&(sample ^ 0x8000).to_be_bytes());
            }
        }
    }
    pad_to_block(&mut bytes, 0);
    bytes
}

/// Write `frame` to `path`, replacing any existing file.
pub fn write_fits(frame: &Frame, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&fits_bytes(frame))?;
    out.flush()?;
    debug!("wrote {}", path.display());
    Ok(())
}
