// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Frame (SOF0) and scan (SOS) header parsing.
//!
//! Extracts image dimensions, component sampling factors and Huffman table
//! selectors, and derives the luminance block geometry the detector works
//! in. Only the sampling layouts a surveillance MJPEG stream produces are
//! accepted: luminance 1×1, 1×2, 2×1 or 2×2 with all chroma at 1×1
//! (4:4:4, 4:2:2, 4:2:0), or plain grayscale.

use super::error::{JpegError, Result};

/// Largest accepted image dimension, per side.
pub const MAX_DIMENSION: u16 = 32767;

/// One image component from the SOF0 header.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component ID (typically 1=Y, 2=Cb, 3=Cr).
    pub id: u8,
    /// Horizontal sampling factor.
    pub h_sampling: u8,
    /// Vertical sampling factor.
    pub v_sampling: u8,
}

/// Frame header parsed from SOF0.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    /// Image height in pixels.
    pub height: u16,
    /// Image width in pixels.
    pub width: u16,
    /// Components in declaration order.
    pub components: Vec<Component>,
}

/// Parse a SOF0 segment body (after the 2-byte length).
pub fn parse_sof(data: &[u8]) -> Result<FrameHeader> {
    if data.len() < 6 {
        return Err(JpegError::ShortOfData);
    }

    let precision = data[0];
    if precision != 8 {
        return Err(JpegError::Unsupported("sample precision"));
    }

    let height = u16::from_be_bytes([data[1], data[2]]);
    let width = u16::from_be_bytes([data[3], data[4]]);
    let num_components = data[5] as usize;

    if height == 0 {
        return Err(JpegError::Unsupported("zero height"));
    }
    if width == 0 {
        return Err(JpegError::UnexpectedData("zero width"));
    }
    if height > MAX_DIMENSION || width > MAX_DIMENSION {
        return Err(JpegError::UnexpectedData("image dimension"));
    }
    if num_components != 1 && num_components != 3 {
        return Err(JpegError::Unsupported("component count"));
    }
    if data.len() < 6 + num_components * 3 {
        return Err(JpegError::ShortOfData);
    }

    let mut components = Vec::with_capacity(num_components);
    for i in 0..num_components {
        let offset = 6 + i * 3;
        let id = data[offset];
        let sampling = data[offset + 1];
        // The third byte selects a quantization table; the coefficient
        // extractor never dequantizes, so it is not recorded.
        if components.iter().any(|c: &Component| c.id == id) {
            return Err(JpegError::UnexpectedData("duplicate component ID"));
        }
        components.push(Component {
            id,
            h_sampling: sampling >> 4,
            v_sampling: sampling & 0x0F,
        });
    }

    Ok(FrameHeader {
        height,
        width,
        components,
    })
}

/// One scan component: a frame component plus its Huffman table selectors.
#[derive(Debug, Clone)]
pub struct ScanComponent {
    /// Index into [`FrameHeader::components`].
    pub comp_idx: usize,
    /// DC Huffman table selector (0 or 1).
    pub dc_table: usize,
    /// AC Huffman table selector (0 or 1).
    pub ac_table: usize,
}

/// Scan header parsed from SOS, with the derived luminance geometry.
#[derive(Debug, Clone)]
pub struct ScanHeader {
    /// Scan components in coding order (luminance first).
    pub components: Vec<ScanComponent>,
    /// Luminance horizontal sampling factor (1 or 2).
    pub luma_h: usize,
    /// Luminance vertical sampling factor (1 or 2).
    pub luma_v: usize,
    /// Luminance 8×8 block count, horizontal.
    pub block_num_x: usize,
    /// Luminance 8×8 block count, vertical.
    pub block_num_y: usize,
}

/// Parse an SOS segment body against the frame header.
///
/// Matches each scan component to its SOF declaration, validates the table
/// selectors and sampling layout, and computes the luminance block counts:
/// `ceil(dim / 8)` for unsampled axes, `2 * ceil(dim / 16)` for subsampled
/// ones. The trailing spectral-selection bytes are consumed unchecked.
pub fn parse_sos(data: &[u8], frame: &FrameHeader) -> Result<ScanHeader> {
    if data.is_empty() {
        return Err(JpegError::ShortOfData);
    }
    let num_components = data[0] as usize;
    if num_components != 1 && num_components != 3 {
        return Err(JpegError::Unsupported("scan component count"));
    }
    // Component selectors plus Ss, Se, AhAl
    if data.len() < 1 + num_components * 2 + 3 {
        return Err(JpegError::ShortOfData);
    }

    let mut components = Vec::with_capacity(num_components);
    for i in 0..num_components {
        let offset = 1 + i * 2;
        let comp_id = data[offset];
        let td_ta = data[offset + 1];
        let dc_table = (td_ta >> 4) as usize;
        let ac_table = (td_ta & 0x0F) as usize;
        if dc_table > 1 || ac_table > 1 {
            return Err(JpegError::InvalidParam);
        }

        let comp_idx = frame
            .components
            .iter()
            .position(|c| c.id == comp_id)
            .ok_or(JpegError::UnexpectedData("unknown scan component ID"))?;

        let comp = &frame.components[comp_idx];
        if i == 0 {
            // Luminance: 1×1, 1×2, 2×1 or 2×2
            if comp.h_sampling > 2 || comp.v_sampling > 2 || comp.h_sampling == 0 || comp.v_sampling == 0 {
                return Err(JpegError::Unsupported("luminance sampling"));
            }
        } else if comp.h_sampling != 1 || comp.v_sampling != 1 {
            return Err(JpegError::Unsupported("chroma sampling"));
        }

        components.push(ScanComponent {
            comp_idx,
            dc_table,
            ac_table,
        });
    }

    let luma = &frame.components[components[0].comp_idx];
    let luma_h = luma.h_sampling as usize;
    let luma_v = luma.v_sampling as usize;
    let width = frame.width as usize;
    let height = frame.height as usize;

    let block_num_x = if luma_h == 1 {
        width.div_ceil(8)
    } else {
        2 * width.div_ceil(16)
    };
    let block_num_y = if luma_v == 1 {
        height.div_ceil(8)
    } else {
        2 * height.div_ceil(16)
    };

    Ok(ScanHeader {
        components,
        luma_h,
        luma_v,
        block_num_x,
        block_num_y,
    })
}
