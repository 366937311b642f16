// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Pure-Rust JPEG coefficient extraction (zero external dependencies).
//!
//! Parses baseline sequential JPEG and exposes the quantized luminance DCT
//! coefficients without any pixel-domain processing — no IDCT, no
//! dequantization, no color conversion. This is the foundation of the
//! detection engine, which measures motion entirely in the DCT domain.
//!
//! Supports:
//! - Baseline sequential DCT (SOF0), 8-bit precision, single scan
//! - YCbCr and grayscale; chroma subsampling 4:2:0, 4:2:2, 4:4:4
//! - Byte-stuffed entropy data and 0xFF fill bytes before markers
//!
//! Does NOT support:
//! - Progressive DCT, arithmetic coding, lossless — rejected at parse time
//! - Restart markers (a nonzero DRI interval fails the parse)

pub mod bitio;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod marker;
pub mod scan;
pub mod tables;
pub mod zigzag;

use error::{JpegError, Result};
use frame::{FrameHeader, ScanHeader};
use marker::walk;
use tables::{parse_dht, parse_dqt, recover_q_factor, HuffmanSpec};

/// Upper bound on luminance blocks per frame (64 MiB of coefficients).
/// Well above any camera stream; merely keeps a hostile header from
/// provoking a giant allocation.
const MAX_BLOCKS: usize = 1 << 19;

/// Quantized luminance DCT coefficients of one decoded frame.
///
/// Produced transactionally by [`JpegFrame::parse`]: feed it a complete
/// JPEG byte stream (SOI..EOI), get back a value. Coefficients are stored
/// in zigzag order within each 8×8 block, blocks in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegFrame {
    width: u16,
    height: u16,
    block_num_x: usize,
    block_num_y: usize,
    q_factor: u8,
    luma_coeffs: Vec<i16>,
}

impl JpegFrame {
    /// Parse a baseline JPEG and extract its luminance coefficients.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_buffer(data, Vec::new())
    }

    /// Like [`JpegFrame::parse`], reusing `buffer`'s allocation for the
    /// coefficient array. Hand in the retired frame's buffer (via
    /// [`JpegFrame::into_coeffs`]) to avoid per-frame allocation.
    pub fn parse_with_buffer(data: &[u8], mut buffer: Vec<i16>) -> Result<Self> {
        let (segments, scan_start) = walk(data)?;

        let mut frame_header: Option<FrameHeader> = None;
        let mut scan_header: Option<ScanHeader> = None;
        let mut q_factor: Option<u8> = None;
        let mut dc_specs: [Option<HuffmanSpec>; 2] = [None, None];
        let mut ac_specs: [Option<HuffmanSpec>; 2] = [None, None];

        for segment in &segments {
            match segment.marker {
                marker::DQT => {
                    let parsed = parse_dqt(segment.data)?;
                    // The first table of the first DQT segment carries the
                    // luminance quantization the Q factor is derived from.
                    if q_factor.is_none() {
                        if let Some((_, values)) = parsed.first() {
                            q_factor = Some(recover_q_factor(values));
                        }
                    }
                }
                marker::DHT => {
                    for spec in parse_dht(segment.data)? {
                        let slot = spec.id as usize;
                        if spec.class == 0 {
                            dc_specs[slot] = Some(spec);
                        } else {
                            ac_specs[slot] = Some(spec);
                        }
                    }
                }
                marker::SOF0 => {
                    frame_header = Some(frame::parse_sof(segment.data)?);
                }
                marker::DRI => {
                    if segment.data.len() != 2 {
                        return Err(JpegError::BadMarkerSegment("DRI length"));
                    }
                    let interval = u16::from_be_bytes([segment.data[0], segment.data[1]]);
                    if interval != 0 {
                        return Err(JpegError::Unsupported("restart interval"));
                    }
                }
                marker::SOS => {
                    let fh = frame_header.as_ref().ok_or(JpegError::LackOfMarker)?;
                    scan_header = Some(frame::parse_sos(segment.data, fh)?);
                }
                // APPn, COM and friends carry no coefficient information
                _ => {}
            }
        }

        let frame_header = frame_header.ok_or(JpegError::LackOfMarker)?;
        let scan_header = scan_header.ok_or(JpegError::LackOfMarker)?;
        let q_factor = q_factor.ok_or(JpegError::LackOfMarker)?;

        let block_count = scan_header.block_num_x * scan_header.block_num_y;
        if block_count == 0 || block_count > MAX_BLOCKS {
            return Err(JpegError::ShortOfMemory);
        }

        buffer.clear();
        buffer.resize(block_count * 64, 0);

        scan::decode_scan(
            data,
            scan_start,
            &scan_header,
            &frame_header,
            &dc_specs,
            &ac_specs,
            &mut buffer,
        )?;

        Ok(Self {
            width: frame_header.width,
            height: frame_header.height,
            block_num_x: scan_header.block_num_x,
            block_num_y: scan_header.block_num_y,
            q_factor,
            luma_coeffs: buffer,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8×8 luminance blocks horizontally.
    pub fn block_num_x(&self) -> usize {
        self.block_num_x
    }

    /// Number of 8×8 luminance blocks vertically.
    pub fn block_num_y(&self) -> usize {
        self.block_num_y
    }

    /// Total luminance block count.
    pub fn block_count(&self) -> usize {
        self.block_num_x * self.block_num_y
    }

    /// Recovered quality factor (1–100).
    pub fn q_factor(&self) -> u8 {
        self.q_factor
    }

    /// All luminance coefficients: zigzag order per block, blocks in
    /// raster order. Length is `block_count() * 64`.
    pub fn luma_coeffs(&self) -> &[i16] {
        &self.luma_coeffs
    }

    /// Iterate the 64-coefficient blocks in raster order.
    pub fn blocks(&self) -> impl Iterator<Item = &[i16]> {
        self.luma_coeffs.chunks_exact(64)
    }

    /// Consume the frame, returning its coefficient buffer for reuse.
    pub fn into_coeffs(self) -> Vec<i16> {
        self.luma_coeffs
    }

    #[cfg(test)]
    pub(crate) fn synthetic(
        block_num_x: usize,
        block_num_y: usize,
        q_factor: u8,
        luma_coeffs: Vec<i16>,
    ) -> Self {
        assert_eq!(luma_coeffs.len(), block_num_x * block_num_y * 64);
        Self {
            width: (block_num_x * 8) as u16,
            height: (block_num_y * 8) as u16,
            block_num_x,
            block_num_y,
            q_factor,
            luma_coeffs,
        }
    }
}
