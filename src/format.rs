//! Line grammar of the annotation text format.
//!
//! Each line is trimmed and then matched against one of two record kinds:
//!
//! ```text
//! Frame count: 12 Width: 1920 Heigth: 1080
//! Label: car ID: 2 Confidence: 0.87 Detection count: 1 Position: center=(0.5120, 0.4410) Bounds: xmin=0.4000, ymin=0.3000, xmax=0.6240, ymax=0.5820
//! ```
//!
//! `Heigth` is spelled the way the producer writes it. Numbers are unsigned;
//! a line whose prefix matches but whose fields do not is malformed.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::detection::Detection;
use crate::error::{Error, Result};

pub const HEADER_PREFIX: &str = "Frame count:";
pub const DETECTION_PREFIX: &str = "Label:";

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Header {
        frame_number: u32,
        width: u32,
        height: u32,
    },
    Detection(Detection),
}

fn header_re() -> &'static Regex {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    HEADER_RE.get_or_init(|| {
        Regex::new(r"^Frame count:\s*(\d+)\s+Width:\s*(\d+)\s+Heigth:\s*(\d+)").unwrap()
    })
}

fn detection_re() -> &'static Regex {
    static DETECTION_RE: OnceLock<Regex> = OnceLock::new();
    DETECTION_RE.get_or_init(|| {
        Regex::new(concat!(
            r"^Label:\s*(\S+)\s+ID:\s*(\d+)\s+Confidence:\s*([\d.]+)\s+",
            r"Detection count:\s*(\d+)\s+",
            r"Position:\s*center=\(([\d.]+),\s*([\d.]+)\)\s+",
            r"Bounds:\s*xmin=([\d.]+),\s*ymin=([\d.]+),\s*xmax=([\d.]+),\s*ymax=([\d.]+)",
        ))
        .unwrap()
    })
}

/// Decodes one raw line. `line_no` is 1-based and only used for errors.
///
/// Returns `Ok(None)` for blank lines and `Err(Error::MalformedLine)` for
/// anything that is not a well-formed header or detection.
pub fn decode_line(line_no: usize, raw: &str) -> Result<Option<Record>> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let malformed = |reason: String| Error::MalformedLine {
        line: line_no,
        reason,
    };

    if line.starts_with(HEADER_PREFIX) {
        let caps = header_re()
            .captures(line)
            .ok_or_else(|| malformed("frame header does not match".into()))?;

        return Ok(Some(Record::Header {
            frame_number: field(&caps, 1, "frame count").map_err(malformed)?,
            width: field(&caps, 2, "width").map_err(malformed)?,
            height: field(&caps, 3, "height").map_err(malformed)?,
        }));
    }

    if line.starts_with(DETECTION_PREFIX) {
        let caps = detection_re()
            .captures(line)
            .ok_or_else(|| malformed("detection does not match".into()))?;

        let detection = Detection {
            label: caps[1].to_string(),
            id: field(&caps, 2, "id").map_err(malformed)?,
            confidence: field(&caps, 3, "confidence").map_err(malformed)?,
            detection_count: field(&caps, 4, "detection count").map_err(malformed)?,
            center_x: field(&caps, 5, "center x").map_err(malformed)?,
            center_y: field(&caps, 6, "center y").map_err(malformed)?,
            xmin: field(&caps, 7, "xmin").map_err(malformed)?,
            ymin: field(&caps, 8, "ymin").map_err(malformed)?,
            xmax: field(&caps, 9, "xmax").map_err(malformed)?,
            ymax: field(&caps, 10, "ymax").map_err(malformed)?,
        };

        return Ok(Some(Record::Detection(detection)));
    }

    Err(malformed("unrecognized record".into()))
}

fn field<T: FromStr>(caps: &Captures<'_>, idx: usize, name: &str) -> std::result::Result<T, String> {
    let text = &caps[idx];

    text.parse()
        .map_err(|_| format!("invalid {} {:?}", name, text))
}
