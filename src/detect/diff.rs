// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Interframe coefficient difference engine.
//!
//! For each 8×8 block, sums the absolute differences of all 64 quantized
//! luminance coefficients between the two frames, applies a quality-factor
//! correction, and clamps the result into 0..=255. High-quality JPEGs
//! carry larger coefficient magnitudes for the same scene change, so the
//! correction scales the raw sums back onto one comparable range.

use crate::jpeg::JpegFrame;

/// Result of one frame-pair comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Blocks whose change value met the sensitivity threshold.
    pub detected_blocks: usize,
    /// Largest change value of the frame; -1 when the frame has no blocks.
    pub max_change: i32,
}

/// Compare two frames block by block, writing change values into
/// `change_map`.
///
/// The map is cleared first in every case. Returns `None` without further
/// effect when the comparison cannot run: a missing or mismatched frame,
/// unequal quality factors, a map of the wrong size, or a zero threshold.
pub fn compare(
    current: Option<&JpegFrame>,
    previous: Option<&JpegFrame>,
    change_map: &mut [u8],
    threshold: u16,
) -> Option<DiffOutcome> {
    change_map.fill(0);

    let cur = current?;
    let prev = previous?;
    if cur.block_num_x() == 0 || cur.block_num_y() == 0 {
        return None;
    }
    if cur.block_num_x() != prev.block_num_x() || cur.block_num_y() != prev.block_num_y() {
        return None;
    }
    if cur.q_factor() != prev.q_factor() {
        return None;
    }
    if change_map.len() != cur.block_count() {
        return None;
    }
    if threshold == 0 {
        return None;
    }

    let (shift, adjust) = q_correction(cur.q_factor());

    let mut detected_blocks = 0usize;
    let mut max_change = -1i32;

    for ((entry, cur_block), prev_block) in
        change_map.iter_mut().zip(cur.blocks()).zip(prev.blocks())
    {
        let sum: u32 = cur_block
            .iter()
            .zip(prev_block)
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
            .sum();
        let diff = ((sum * adjust) >> shift).min(255);
        *entry = diff as u8;

        if diff as u16 >= threshold {
            detected_blocks += 1;
        }
        // Ties update, so repeated maxima keep the latest block's value
        if diff as i32 >= max_change {
            max_change = diff as i32;
        }
    }

    Some(DiffOutcome {
        detected_blocks,
        max_change,
    })
}

/// Quality-factor correction: `(shift, adjust)` such that the corrected
/// value is `(raw_sum * adjust) >> shift`.
fn q_correction(q_factor: u8) -> (u32, u32) {
    if q_factor <= 68 {
        (0, 1)
    } else if q_factor < 97 {
        (5, 100 - q_factor as u32)
    } else {
        (7, 112 - q_factor as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(q: u8, blocks: &[[i16; 64]]) -> JpegFrame {
        let coeffs: Vec<i16> = blocks.iter().flatten().copied().collect();
        JpegFrame::synthetic(blocks.len(), 1, q, coeffs)
    }

    fn zero_block() -> [i16; 64] {
        [0; 64]
    }

    fn dc_block(dc: i16) -> [i16; 64] {
        let mut b = [0i16; 64];
        b[0] = dc;
        b
    }

    #[test]
    fn identical_frames_yield_zero_map() {
        let a = frame_with(50, &[dc_block(100), dc_block(-3)]);
        let b = a.clone();
        let mut map = vec![0xAAu8; 2];
        let outcome = compare(Some(&a), Some(&b), &mut map, 10).unwrap();
        assert_eq!(map, vec![0, 0]);
        assert_eq!(outcome.detected_blocks, 0);
        assert_eq!(outcome.max_change, 0);
    }

    #[test]
    fn low_quality_sum_is_unscaled() {
        let a = frame_with(50, &[zero_block(), zero_block()]);
        let b = frame_with(50, &[dc_block(10), zero_block()]);
        let mut map = vec![0u8; 2];
        let outcome = compare(Some(&b), Some(&a), &mut map, 10).unwrap();
        assert_eq!(map, vec![10, 0]);
        assert_eq!(outcome.detected_blocks, 1);
        assert_eq!(outcome.max_change, 10);
    }

    #[test]
    fn q80_scales_down() {
        // (10 * (100 - 80)) >> 5 = 6
        let a = frame_with(80, &[zero_block()]);
        let b = frame_with(80, &[dc_block(10)]);
        let mut map = vec![0u8; 1];
        let outcome = compare(Some(&b), Some(&a), &mut map, 10).unwrap();
        assert_eq!(map, vec![6]);
        assert_eq!(outcome.detected_blocks, 0);
        assert_eq!(outcome.max_change, 6);
    }

    #[test]
    fn q97_scales_down_harder() {
        // (128 * (112 - 97)) >> 7 = 15
        let a = frame_with(97, &[zero_block()]);
        let b = frame_with(97, &[dc_block(128)]);
        let mut map = vec![0u8; 1];
        let outcome = compare(Some(&b), Some(&a), &mut map, 10).unwrap();
        assert_eq!(map, vec![15]);
        assert_eq!(outcome.max_change, 15);
    }

    #[test]
    fn change_values_clamp_at_255() {
        let a = frame_with(50, &[zero_block()]);
        let mut big = [0i16; 64];
        big.fill(2047);
        let b = frame_with(50, &[big]);
        let mut map = vec![0u8; 1];
        let outcome = compare(Some(&b), Some(&a), &mut map, 10).unwrap();
        assert_eq!(map, vec![255]);
        assert_eq!(outcome.max_change, 255);
    }

    #[test]
    fn threshold_is_inclusive() {
        let a = frame_with(50, &[zero_block()]);
        let b = frame_with(50, &[dc_block(10)]);
        let mut map = vec![0u8; 1];
        assert_eq!(
            compare(Some(&b), Some(&a), &mut map, 10).unwrap().detected_blocks,
            1
        );
        assert_eq!(
            compare(Some(&b), Some(&a), &mut map, 11).unwrap().detected_blocks,
            0
        );
    }

    #[test]
    fn refuses_missing_or_mismatched_frames() {
        let a = frame_with(50, &[dc_block(5)]);
        let mut map = vec![0xFFu8; 1];

        assert!(compare(None, Some(&a), &mut map, 10).is_none());
        assert_eq!(map, vec![0], "map is cleared even on refusal");

        let b = frame_with(50, &[dc_block(5), dc_block(5)]);
        assert!(compare(Some(&a), Some(&b), &mut map, 10).is_none());

        let c = frame_with(75, &[dc_block(5)]);
        assert!(compare(Some(&a), Some(&c), &mut map, 10).is_none());

        assert!(compare(Some(&a), Some(&a), &mut map, 0).is_none());

        let mut wrong_size = vec![0u8; 3];
        assert!(compare(Some(&a), Some(&a), &mut wrong_size, 10).is_none());
    }

    #[test]
    fn negative_coefficients_use_absolute_difference() {
        let a = frame_with(50, &[dc_block(-20)]);
        let b = frame_with(50, &[dc_block(20)]);
        let mut map = vec![0u8; 1];
        let outcome = compare(Some(&b), Some(&a), &mut map, 10).unwrap();
        assert_eq!(map, vec![40]);
        assert_eq!(outcome.max_change, 40);
    }
}
