//! EXIF date extraction.
//!
//! Reads the three capture-related timestamps from a JPEG/PNG/TIFF container
//! with `kamadak-exif`. The parser is a pure function over bytes; the backend
//! does the file read.

use super::backend::ImageMetadata;
use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// Extract capture dates from raw image bytes.
///
/// Returns `None` when the bytes carry no readable EXIF block at all. A block
/// with none of the date tags yields `Some(ImageMetadata::default())`.
pub fn parse_exif_dates(bytes: &[u8]) -> Option<ImageMetadata> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let date = |tag: Tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Ascii(parts) => parts.first().and_then(|raw| parse_exif_datetime(raw)),
                _ => None,
            })
    };

    Some(ImageMetadata {
        original: date(Tag::DateTimeOriginal),
        created: date(Tag::DateTimeDigitized),
        modified: date(Tag::DateTime),
    })
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value.
///
/// Falls back to the date part alone (midnight) when the time is blank or
/// malformed, which some cameras write as `2019:07:01    :  :  `.
fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    if let Ok(dt) = exif::DateTime::from_ascii(raw) {
        return NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
            .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into());
    }

    let text = std::str::from_utf8(raw).ok()?.trim_matches(char::from(0)).trim();
    let date_part = text.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y:%m:%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}
