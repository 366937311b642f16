// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Motion detection facade.
//!
//! [`Detector`] binds the frame store, the difference engine and the
//! auto-sensitivity calibration behind one `process_frame` call, fanning
//! the results out to registered observers. Everything runs synchronously
//! inside the caller's thread; one detector serves one stream, and
//! observers must return before the next frame enters.

pub mod config;
pub mod diff;
pub mod sensitivity;
pub mod store;

use log::{info, trace};

pub use config::DetectorConfig;
pub use diff::DiffOutcome;
pub use sensitivity::AutoSensitivityResult;

use config::{clamp_area_threshold, internal_to_user, user_to_internal};
use sensitivity::AutoSensitivity;
use store::FrameStore;

/// Callbacks fired after each processed frame, in declaration order.
/// All methods default to no-ops; override the ones of interest.
pub trait DetectionObserver {
    /// The frame that was just compared, or `None` when no comparison was
    /// possible (parse failure, first frame, geometry change).
    fn on_frame(&mut self, _jpeg: Option<&[u8]>, _original: Option<&[u8]>) {}

    /// The per-block change map for the frame, alongside the internal
    /// threshold it was counted against.
    fn on_change_info(
        &mut self,
        _jpeg: Option<&[u8]>,
        _change_map: &[u8],
        _threshold: u16,
        _original: Option<&[u8]>,
    ) {
    }

    /// Percentage of blocks whose change met the threshold (0.0–100.0).
    fn on_detected_area(&mut self, _percent: f64) {}

    /// Auto-sensitivity outcome on the user scale (1–256), or 0 when the
    /// calibration window timed out.
    fn on_auto_sensitivity(&mut self, _sensitivity: u16) {}
}

/// Summary of one processed frame, also returned to the caller directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionReport {
    /// Whether the frame parsed as a baseline JPEG.
    pub parsed: bool,
    /// Whether a frame-pair comparison ran.
    pub compared: bool,
    /// Blocks at or above the sensitivity threshold (0 when not compared).
    pub detected_blocks: usize,
    /// Largest per-block change value; -1 when not compared.
    pub max_change: i32,
    /// Detected area as a percentage of all blocks (0.0 when not compared).
    pub detected_area: f64,
}

/// Compressed-domain motion detector for one MJPEG stream.
pub struct Detector {
    store: FrameStore,
    auto: AutoSensitivity,
    /// Internal per-block threshold, 1..=256 (lower = more sensitive).
    threshold: u16,
    area_threshold: f64,
    observers: Vec<Box<dyn DetectionObserver>>,
}

impl Detector {
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            store: FrameStore::new(),
            auto: AutoSensitivity::new(),
            threshold: user_to_internal(config.sensitivity),
            area_threshold: clamp_area_threshold(config.detected_area_threshold),
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn DetectionObserver>) {
        self.observers.push(observer);
    }

    /// Current settings as a persistable config value.
    pub fn config(&self) -> DetectorConfig {
        DetectorConfig {
            sensitivity: self.sensitivity(),
            detected_area_threshold: self.area_threshold,
        }
    }

    /// User-scale sensitivity (1–256).
    pub fn sensitivity(&self) -> u16 {
        internal_to_user(self.threshold)
    }

    /// Set the user-scale sensitivity; out-of-range values are clamped.
    pub fn set_sensitivity(&mut self, sensitivity: u16) {
        self.threshold = user_to_internal(sensitivity);
    }

    /// Detected-area reporting threshold in percent.
    pub fn detected_area_threshold(&self) -> f64 {
        self.area_threshold
    }

    /// Set the detected-area reporting threshold (clamped to 0–100). The
    /// engine stores it for the host; it never influences detection.
    pub fn set_detected_area_threshold(&mut self, percent: f64) {
        self.area_threshold = clamp_area_threshold(percent);
    }

    /// Begin auto-sensitivity calibration. Returns false when a window is
    /// already open.
    pub fn start_auto_sensitivity(&mut self) -> bool {
        self.auto.start()
    }

    /// The change map of the most recent comparison.
    pub fn change_map(&self) -> &[u8] {
        self.store.change_map()
    }

    /// Drop both stored frames, the latched geometry and any calibration
    /// in progress. Use when the stream restarts or changes resolution.
    pub fn reset(&mut self) {
        self.store.reset();
        self.auto.reset();
    }

    /// Process one frame: parse, compare against the previous frame,
    /// notify observers, and feed the calibration.
    ///
    /// `original` is carried to the observers untouched; hosts use it for
    /// a pre-overlay copy of the frame.
    pub fn process_frame(&mut self, jpeg: &[u8], original: Option<&[u8]>) -> DetectionReport {
        let parsed = self.store.ingest(jpeg);

        let threshold = self.threshold;
        let outcome = {
            let (current, previous, change_map) = self.store.split();
            diff::compare(current, previous, change_map, threshold)
        };

        let report = match outcome {
            Some(o) => {
                let total = self.store.change_map().len();
                DetectionReport {
                    parsed,
                    compared: true,
                    detected_blocks: o.detected_blocks,
                    max_change: o.max_change,
                    detected_area: 100.0 * o.detected_blocks as f64 / total as f64,
                }
            }
            None => DetectionReport {
                parsed,
                compared: false,
                detected_blocks: 0,
                max_change: -1,
                detected_area: 0.0,
            },
        };
        trace!(
            "frame: parsed={} compared={} detected={} max={} area={:.1}%",
            report.parsed,
            report.compared,
            report.detected_blocks,
            report.max_change,
            report.detected_area
        );

        let image = if report.compared { Some(jpeg) } else { None };
        for observer in &mut self.observers {
            observer.on_frame(image, original);
        }
        for observer in &mut self.observers {
            observer.on_change_info(image, self.store.change_map(), threshold, original);
        }
        for observer in &mut self.observers {
            observer.on_detected_area(report.detected_area);
        }

        if report.compared && self.auto.is_running() {
            self.auto.submit(report.max_change);
            match self.auto.poll() {
                AutoSensitivityResult::Calibrated(internal) => {
                    let user = internal_to_user(internal);
                    info!("auto sensitivity calibrated: {user}");
                    for observer in &mut self.observers {
                        observer.on_auto_sensitivity(user);
                    }
                }
                AutoSensitivityResult::TimedOut => {
                    info!("auto sensitivity timed out");
                    for observer in &mut self.observers {
                        observer.on_auto_sensitivity(0);
                    }
                }
                AutoSensitivityResult::Pending | AutoSensitivityResult::NotRunning => {}
            }
        }

        report
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
