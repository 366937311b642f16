// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! JPEG marker segment iteration.
//!
//! Walks the marker segments in a JPEG byte stream up to and including the
//! SOS header, returning borrowed segment bodies and the byte offset where
//! entropy-coded scan data begins. Fill 0xFF bytes before a marker are
//! tolerated; markers that cannot legally appear before SOS are rejected.

use super::error::{JpegError, Result};

/// JPEG marker constants.
pub const TEM: u8 = 0x01;
pub const SOF0: u8 = 0xC0;
pub const DHT: u8 = 0xC4;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;

/// A marker segment borrowed from the input stream.
#[derive(Debug)]
pub struct Segment<'a> {
    /// The marker byte (e.g. 0xDB for DQT), without the 0xFF prefix.
    pub marker: u8,
    /// Segment body, excluding the 2-byte length field.
    pub data: &'a [u8],
}

/// Iterate the marker segments of a JPEG header.
///
/// Verifies the SOI marker, then collects every length-bearing segment up
/// to and including SOS. Returns the segments and the offset of the first
/// entropy-coded byte.
pub fn walk(data: &[u8]) -> Result<(Vec<Segment<'_>>, usize)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(JpegError::NoSoiMarker);
    }
    let mut segments = Vec::new();
    let mut pos = 2;

    loop {
        // Find the next 0xFF, then skip any run of fill 0xFF bytes
        while pos < data.len() && data[pos] != 0xFF {
            pos += 1;
        }
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= data.len() {
            return Err(JpegError::LackOfMarker);
        }

        let marker = data[pos + 1];
        pos += 2;

        // Stray stuffed pair outside scan data; tolerated
        if marker == 0x00 {
            continue;
        }

        // Standalone markers have no business before the scan
        if marker == SOI || marker == EOI || marker == TEM || (marker & 0xF8) == 0xD0 {
            return Err(JpegError::UnexpectedMarker(marker));
        }

        // Frame types other than baseline sequential
        if is_unsupported(marker) {
            return Err(JpegError::Unsupported("non-baseline frame type"));
        }

        if pos + 2 > data.len() {
            return Err(JpegError::ShortOfData);
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if length < 2 || pos + length > data.len() {
            return Err(JpegError::BadMarkerSegment("segment length"));
        }
        segments.push(Segment {
            marker,
            data: &data[pos + 2..pos + length],
        });
        pos += length;

        if marker == SOS {
            return Ok((segments, pos));
        }
    }
}

fn is_unsupported(marker: u8) -> bool {
    matches!(
        marker,
        0xC1..=0xC3 // SOF1 extended, SOF2 progressive, SOF3 lossless
        | 0xC5..=0xC7 // SOF5-7 differential
        | 0xC8 // JPG reserved
        | 0xC9..=0xCB // SOF9-11 arithmetic
        | 0xCC // DAC arithmetic conditioning
        | 0xCD..=0xCF // SOF13-15 differential arithmetic
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_header_up_to_sos() {
        let data = [
            0xFF, 0xD8, // SOI
            0xFF, 0xDA, 0x00, 0x03, 0x01, // SOS, length 3, body [0x01]
            0xAB, // scan data
        ];
        let (segments, scan_start) = walk(&data).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].marker, SOS);
        assert_eq!(segments[0].data, &[0x01]);
        assert_eq!(scan_start, 7);
    }

    #[test]
    fn missing_soi() {
        assert_eq!(walk(&[0x00, 0x00]).unwrap_err(), JpegError::NoSoiMarker);
        assert_eq!(walk(&[0xFF]).unwrap_err(), JpegError::NoSoiMarker);
    }

    #[test]
    fn fill_bytes_before_marker_are_skipped() {
        let data = [
            0xFF, 0xD8, // SOI
            0xFF, 0xFF, 0xFF, 0xDA, 0x00, 0x03, 0x01, // fill run, then SOS
        ];
        let (segments, _) = walk(&data).unwrap();
        assert_eq!(segments[0].marker, SOS);
    }

    #[test]
    fn reject_progressive() {
        let data = [0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x02];
        assert!(matches!(
            walk(&data),
            Err(JpegError::Unsupported(_))
        ));
    }

    #[test]
    fn reject_restart_marker_in_header() {
        let data = [0xFF, 0xD8, 0xFF, 0xD3];
        assert_eq!(walk(&data).unwrap_err(), JpegError::UnexpectedMarker(0xD3));
    }

    #[test]
    fn reject_early_eoi() {
        let data = [0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(walk(&data).unwrap_err(), JpegError::UnexpectedMarker(0xD9));
    }

    #[test]
    fn truncated_header_lacks_marker() {
        let data = [0xFF, 0xD8, 0x12, 0x34];
        assert_eq!(walk(&data).unwrap_err(), JpegError::LackOfMarker);
    }

    #[test]
    fn bad_segment_length() {
        let data = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x01];
        assert!(matches!(
            walk(&data),
            Err(JpegError::BadMarkerSegment(_))
        ));
    }

    #[test]
    fn skips_app_and_comment_segments() {
        let data = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0xDE, 0xAD, // APP0
            0xFF, 0xFE, 0x00, 0x04, 0x68, 0x69, // COM "hi"
            0xFF, 0xDA, 0x00, 0x03, 0x01, // SOS
        ];
        let (segments, scan_start) = walk(&data).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].marker, 0xE0);
        assert_eq!(segments[1].marker, 0xFE);
        assert_eq!(segments[2].marker, SOS);
        assert_eq!(scan_start, data.len());
    }
}
