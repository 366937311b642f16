// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! # vigil-core
//!
//! Compressed-domain motion detection for MJPEG camera streams. Instead of
//! decoding frames to pixels, the engine extracts the quantized luminance
//! DCT coefficients straight from each JPEG's entropy-coded data and
//! measures how much every 8×8 block changed since the previous frame.
//! That keeps per-frame cost at a fraction of a full decode while staying
//! robust against compression noise.
//!
//! Two layers:
//!
//! - [`jpeg`] — a baseline JPEG parser reduced to coefficient extraction:
//!   no IDCT, no dequantization, no color conversion.
//! - [`detect`] — the detection engine: ping-pong frame storage, the
//!   per-block difference map with quality-factor correction, and an
//!   automatic sensitivity calibration.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use vigil_core::{Detector, DetectionObserver};
//!
//! struct AreaLogger;
//! impl DetectionObserver for AreaLogger {
//!     fn on_detected_area(&mut self, percent: f64) {
//!         println!("{percent:.1}% of the scene changed");
//!     }
//! }
//!
//! let mut detector = Detector::new();
//! detector.set_sensitivity(200);
//! detector.add_observer(Box::new(AreaLogger));
//! for frame in camera_frames() {
//!     detector.process_frame(&frame, None);
//! }
//! ```

pub mod detect;
pub mod jpeg;

pub use detect::{
    AutoSensitivityResult, DetectionObserver, DetectionReport, Detector, DetectorConfig,
};
pub use jpeg::error::{JpegError, Result as JpegResult};
pub use jpeg::JpegFrame;
