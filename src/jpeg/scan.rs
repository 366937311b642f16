// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Entropy decoding of the baseline scan.
//!
//! Decodes the single interleaved scan into the luminance coefficient
//! array. Chroma blocks are Huffman-decoded to keep the bit stream in sync
//! but their coefficients are discarded — the detector only ever compares
//! luminance. Coefficients stay in zigzag order within each block.

use super::bitio::BitReader;
use super::error::{JpegError, Result};
use super::frame::{FrameHeader, ScanHeader};
use super::huffman::{extend_sign, HuffmanDecodeTable};
use super::marker;
use super::tables::HuffmanSpec;

/// Largest DC magnitude category in 8-bit baseline JPEG.
const MAX_DC_CATEGORY: u8 = 11;
/// Largest AC magnitude category in 8-bit baseline JPEG.
const MAX_AC_CATEGORY: u8 = 10;

/// Decode the entropy-coded scan into `out` (luminance only).
///
/// - `data`: the full JPEG byte stream
/// - `scan_start`: offset of the first entropy-coded byte
/// - `out`: zero-initialized, `block_num_x * block_num_y * 64` long
///
/// After the last MCU the trailing fill bits are discarded and an EOI
/// marker is required.
pub fn decode_scan(
    data: &[u8],
    scan_start: usize,
    scan: &ScanHeader,
    frame: &FrameHeader,
    dc_specs: &[Option<HuffmanSpec>; 2],
    ac_specs: &[Option<HuffmanSpec>; 2],
    out: &mut [i16],
) -> Result<()> {
    // Build decode tables for the selectors this scan actually uses
    let mut dc_tables: [Option<HuffmanDecodeTable>; 2] = [None, None];
    let mut ac_tables: [Option<HuffmanDecodeTable>; 2] = [None, None];
    for sc in &scan.components {
        if dc_tables[sc.dc_table].is_none() {
            let spec = dc_specs[sc.dc_table].as_ref().ok_or(JpegError::LackOfMarker)?;
            dc_tables[sc.dc_table] = Some(HuffmanDecodeTable::build(&spec.counts, &spec.values)?);
        }
        if ac_tables[sc.ac_table].is_none() {
            let spec = ac_specs[sc.ac_table].as_ref().ok_or(JpegError::LackOfMarker)?;
            ac_tables[sc.ac_table] = Some(HuffmanDecodeTable::build(&spec.counts, &spec.values)?);
        }
    }

    if scan.block_num_x % scan.luma_h != 0 || scan.block_num_y % scan.luma_v != 0 {
        return Err(JpegError::Internal);
    }
    let mcus_wide = scan.block_num_x / scan.luma_h;
    let mcus_tall = scan.block_num_y / scan.luma_v;

    let mut reader = BitReader::new(data, scan_start);
    let mut dc_pred = vec![0i32; scan.components.len()];

    for mcu_row in 0..mcus_tall {
        for mcu_col in 0..mcus_wide {
            for (sci, sc) in scan.components.iter().enumerate() {
                let dc_tab = dc_tables[sc.dc_table].as_ref().ok_or(JpegError::Internal)?;
                let ac_tab = ac_tables[sc.ac_table].as_ref().ok_or(JpegError::Internal)?;
                let comp = &frame.components[sc.comp_idx];

                if sci == 0 {
                    // Luminance: place each sub-block at its raster offset
                    for v in 0..comp.v_sampling as usize {
                        for h in 0..comp.h_sampling as usize {
                            let block_row = mcu_row * scan.luma_v + v;
                            let block_col = mcu_col * scan.luma_h + h;
                            let offset = (block_row * scan.block_num_x + block_col) * 64;
                            let block = out
                                .get_mut(offset..offset + 64)
                                .ok_or(JpegError::Internal)?;
                            decode_block(&mut reader, dc_tab, ac_tab, &mut dc_pred[sci], Some(block))?;
                        }
                    }
                } else {
                    // Chroma: consume the bits, drop the coefficients
                    decode_block(&mut reader, dc_tab, ac_tab, &mut dc_pred[sci], None)?;
                }
            }
        }
    }

    expect_eoi(data, &reader)
}

/// Decode one 8×8 block. `out`, when present, receives the coefficients in
/// zigzag order; `None` consumes the block without storing it.
fn decode_block(
    reader: &mut BitReader,
    dc_tab: &HuffmanDecodeTable,
    ac_tab: &HuffmanDecodeTable,
    dc_pred: &mut i32,
    out: Option<&mut [i16]>,
) -> Result<()> {
    let dc_size = dc_tab.decode(reader)?;
    if dc_size > MAX_DC_CATEGORY {
        return Err(JpegError::UnexpectedData("DC category"));
    }
    if dc_size > 0 {
        let dc_bits = reader.read_bits(dc_size)?;
        *dc_pred += extend_sign(dc_bits, dc_size) as i32;
    }

    let mut coeffs = [0i16; 64];
    coeffs[0] = (*dc_pred).clamp(i16::MIN as i32, i16::MAX as i32) as i16;

    let mut k = 1;
    while k < 64 {
        let rs = ac_tab.decode(reader)?;
        let zero_run = (rs >> 4) as usize;
        let ac_size = rs & 0x0F;

        if ac_size == 0 {
            if zero_run == 15 {
                // ZRL: sixteen zero coefficients
                k += 16;
                continue;
            }
            // EOB: the rest of the block is zero
            break;
        }
        if ac_size > MAX_AC_CATEGORY {
            return Err(JpegError::UnexpectedData("AC category"));
        }

        k += zero_run;
        if k >= 64 {
            return Err(JpegError::UnexpectedData("AC run past block end"));
        }
        let ac_bits = reader.read_bits(ac_size)?;
        coeffs[k] = extend_sign(ac_bits, ac_size);
        k += 1;
    }

    if let Some(out) = out {
        out.copy_from_slice(&coeffs);
    }
    Ok(())
}

/// Verify the scan is terminated by an EOI marker.
///
/// Fill bits in the last partial byte are accepted unconditionally. The
/// marker may already have been swallowed by an over-long Huffman peek, or
/// still sit (behind optional 0xFF fill bytes) at the reader's position.
fn expect_eoi(data: &[u8], reader: &BitReader) -> Result<()> {
    match reader.marker_found() {
        Some(marker::EOI) => Ok(()),
        Some(m) => Err(JpegError::UnexpectedMarker(m)),
        None => {
            let mut pos = reader.position();
            while pos + 1 < data.len() && data[pos] == 0xFF && data[pos + 1] == 0xFF {
                pos += 1;
            }
            if pos + 1 < data.len() && data[pos] == 0xFF && data[pos + 1] == marker::EOI {
                Ok(())
            } else {
                Err(JpegError::NoEoiMarker)
            }
        }
    }
}
