// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Error types for JPEG coefficient parsing.

use std::fmt;

/// Errors that can occur while extracting DCT coefficients from a JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JpegError {
    /// A parameter in a marker segment is out of its legal range.
    InvalidParam,
    /// The frame geometry would require an unreasonably large allocation.
    ShortOfMemory,
    /// An internal invariant was violated (decoder bug, not input data).
    Internal,
    /// Input data ended before the parse was complete.
    ShortOfData,
    /// A required marker segment (SOF, SOS, DQT, DHT) was never seen.
    LackOfMarker,
    /// Missing SOI (0xFFD8) at the start of the data.
    NoSoiMarker,
    /// Missing EOI (0xFFD9) after the entropy-coded scan.
    NoEoiMarker,
    /// A marker appeared where it is not allowed (SOI/EOI/TEM/RST).
    UnexpectedMarker(u8),
    /// A marker segment has an invalid or inconsistent length.
    BadMarkerSegment(&'static str),
    /// The stream uses a JPEG feature outside single-scan baseline Huffman.
    Unsupported(&'static str),
    /// Well-formed segment framing carrying values the decoder rejects.
    UnexpectedData(&'static str),
}

impl fmt::Display for JpegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParam => write!(f, "marker segment parameter out of range"),
            Self::ShortOfMemory => write!(f, "frame too large to allocate"),
            Self::Internal => write!(f, "internal decoder error"),
            Self::ShortOfData => write!(f, "unexpected end of JPEG data"),
            Self::LackOfMarker => write!(f, "required marker segment missing"),
            Self::NoSoiMarker => write!(f, "missing SOI marker (not a JPEG)"),
            Self::NoEoiMarker => write!(f, "missing EOI marker after scan"),
            Self::UnexpectedMarker(m) => write!(f, "unexpected marker: 0xFF{m:02X}"),
            Self::BadMarkerSegment(msg) => write!(f, "bad marker segment: {msg}"),
            Self::Unsupported(msg) => write!(f, "unsupported JPEG feature: {msg}"),
            Self::UnexpectedData(msg) => write!(f, "unexpected data: {msg}"),
        }
    }
}

impl std::error::Error for JpegError {}

pub type Result<T> = std::result::Result<T, JpegError>;
