// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Frame storage for interframe comparison.
//!
//! Two long-lived slots hold the current and previous frame, ping-ponged
//! by index so the newest frame always overwrites the oldest. The retired
//! frame's coefficient buffer is handed back to the parser, so steady-state
//! operation allocates nothing per frame. The per-block change map is
//! allocated once, when the first frame reveals the stream geometry, and
//! that geometry stays latched until [`FrameStore::reset`].

use log::debug;

use crate::jpeg::JpegFrame;

/// Holder of the two most recent frames and the shared change map.
pub struct FrameStore {
    slots: [Option<JpegFrame>; 2],
    current: usize,
    change_map: Vec<u8>,
    size_latched: bool,
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            current: 0,
            change_map: Vec::new(),
            size_latched: false,
        }
    }

    /// Parse a new frame into the next slot. Returns whether the parse
    /// succeeded; on failure the slot is cleared so the comparison step
    /// refuses to run against it.
    pub fn ingest(&mut self, jpeg: &[u8]) -> bool {
        self.current ^= 1;
        let buffer = self.slots[self.current]
            .take()
            .map(JpegFrame::into_coeffs)
            .unwrap_or_default();

        match JpegFrame::parse_with_buffer(jpeg, buffer) {
            Ok(frame) => {
                if !self.size_latched {
                    self.change_map = vec![0; frame.block_count()];
                    self.size_latched = true;
                }
                self.slots[self.current] = Some(frame);
                true
            }
            Err(e) => {
                debug!("frame rejected: {e}");
                false
            }
        }
    }

    /// The most recently ingested frame, if it parsed.
    pub fn current(&self) -> Option<&JpegFrame> {
        self.slots[self.current].as_ref()
    }

    /// The frame before the current one, if it parsed.
    pub fn previous(&self) -> Option<&JpegFrame> {
        self.slots[self.current ^ 1].as_ref()
    }

    /// The per-block change map (empty until the first successful parse).
    pub fn change_map(&self) -> &[u8] {
        &self.change_map
    }

    /// Both frames and the mutable change map, for the comparison step.
    pub fn split(&mut self) -> (Option<&JpegFrame>, Option<&JpegFrame>, &mut [u8]) {
        let [a, b] = &self.slots;
        let (cur, prev) = if self.current == 0 { (a, b) } else { (b, a) };
        (cur.as_ref(), prev.as_ref(), &mut self.change_map)
    }

    /// Forget both frames and the latched geometry.
    pub fn reset(&mut self) {
        self.slots = [None, None];
        self.current = 0;
        self.change_map = Vec::new();
        self.size_latched = false;
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}
