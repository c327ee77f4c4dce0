//! Per-frame orchestration: wires segmentation, digit matching, number
//! composition, unit tracking and joystick estimation into one pass, and
//! accumulates the per-frame status log.

use anyhow::{Context, Result};
use image::{GrayImage, RgbaImage};
use tracing::{debug, info};

use arena_data::{layout, AnalyzerConfig, IconClassConfig, TemplateLibrary};
use arena_state::{FrameStatus, Point, StatusLog, UnitSnapshot, UnitTracker};
use arena_vision::{
    binary, compose, read_fixed_number, segment, trace_boundaries, CircleDetector, ColorSource,
    DigitMatcher, DigitReading, JoystickEstimator, Polygon,
};

/// The per-frame extraction pipeline plus the cross-frame tracking state.
///
/// Frames must be fed in timestamp order: unit identity continuity
/// depends on monotonic time. Each call to [`FrameAnalyzer::analyze`] is
/// atomic with respect to the tracked set.
pub struct FrameAnalyzer {
    config: AnalyzerConfig,
    cooldown_matcher: DigitMatcher,
    money_matcher: DigitMatcher,
    level_matcher: DigitMatcher,
    mask: Vec<Polygon>,
    tracker: UnitTracker,
    joystick: JoystickEstimator,
    circle_detector: Option<Box<dyn CircleDetector>>,
}

impl FrameAnalyzer {
    /// Build the analyzer from loaded assets. Fails when a template set
    /// is not a complete set of ten; a missing mask only disables the
    /// mask filter.
    pub fn new(
        templates: TemplateLibrary,
        mask_bitmap: Option<&GrayImage>,
        config: AnalyzerConfig,
    ) -> Result<Self> {
        let cooldown_matcher =
            DigitMatcher::new(templates.cooldown, config.cooldown.error_threshold)
                .context("cooldown template set")?;
        let money_matcher = DigitMatcher::new(templates.money, config.money.error_threshold)
            .context("money template set")?;
        let level_matcher = DigitMatcher::new(templates.level, config.level.error_threshold)
            .context("level template set")?;

        let mask = mask_bitmap.map(trace_boundaries).unwrap_or_default();
        if !mask.is_empty() {
            debug!("exclusion mask: {} polygon(s)", mask.len());
        }

        Ok(Self {
            tracker: UnitTracker::new(config.match_distance, config.stale_window_ms),
            joystick: JoystickEstimator::new(layout::joystick_search(), layout::joystick_axis()),
            config,
            cooldown_matcher,
            money_matcher,
            level_matcher,
            mask,
            circle_detector: None,
        })
    }

    /// Attach the externally supplied circle-detection primitive. Without
    /// one, the joystick is reported as undetected in every frame.
    pub fn with_circle_detector(mut self, detector: Box<dyn CircleDetector>) -> Self {
        self.circle_detector = Some(detector);
        self
    }

    /// Run the full extraction over one frame.
    pub fn analyze(&mut self, frame: &RgbaImage, ts: i64) -> FrameStatus {
        let normalized;
        let frame = if frame.dimensions() == (layout::FRAME_WIDTH, layout::FRAME_HEIGHT) {
            frame
        } else {
            normalized = image::imageops::resize(
                frame,
                layout::FRAME_WIDTH,
                layout::FRAME_HEIGHT,
                image::imageops::FilterType::Triangle,
            );
            &normalized
        };

        let units = self.track_units(frame, ts);
        self.tracker.evict(
            ts,
            self.config.evict_inactive_ms,
            self.config.evict_min_appearances,
        );

        let money = self.read_number_at(frame, layout::money(), &self.money_matcher, &self.config.money);

        let mut spell_cds = [0u32; 3];
        for (cd, rect) in spell_cds.iter_mut().zip(layout::spell_slots()) {
            *cd = self.read_number_at(frame, rect, &self.cooldown_matcher, &self.config.cooldown);
        }
        let mut skill_cds = [0u32; 4];
        for (cd, rect) in skill_cds.iter_mut().zip(layout::skill_slots()) {
            *cd = self.read_number_at(frame, rect, &self.cooldown_matcher, &self.config.cooldown);
        }

        let joystick_angle = match &self.circle_detector {
            Some(detector) => self.joystick.estimate(frame, detector.as_ref()),
            None => None,
        };

        FrameStatus {
            ts,
            joystick_angle,
            spell_cds,
            skill_cds,
            money,
            units,
        }
    }

    /// Segment the whole frame for unit-level icons, classify and compose
    /// the digits, and reconcile every reading against the tracked set.
    fn track_units(&mut self, frame: &RgbaImage, ts: i64) -> Vec<UnitSnapshot> {
        let bw = binary::binarize(frame, self.config.level.binarize);
        let color = ColorSource {
            frame,
            purity: &self.config.purity,
        };
        let regions = segment(&bw, &self.config.level.bounds, &self.mask, Some(color));

        let mut readings = Vec::new();
        for rect in regions {
            let roi = crop_gray(&bw, rect);
            if let Some(digit) = self.level_matcher.classify(&roi) {
                readings.push(DigitReading {
                    x: rect.x,
                    y: rect.y,
                    digit,
                });
            }
        }

        let composed = compose(&readings);
        let mut units = Vec::with_capacity(composed.len());
        for reading in composed {
            units.push(
                self.tracker
                    .reconcile(Point::new(reading.x, reading.y), reading.value, ts),
            );
        }
        if !units.is_empty() {
            debug!("frame {}: {} unit reading(s)", ts, units.len());
        }
        units
    }

    fn read_number_at(
        &self,
        frame: &RgbaImage,
        rect: layout::Rect,
        matcher: &DigitMatcher,
        class: &IconClassConfig,
    ) -> u32 {
        let crop =
            image::imageops::crop_imm(frame, rect.x as u32, rect.y as u32, rect.w, rect.h)
                .to_image();
        read_fixed_number(&crop, matcher, class)
    }

    /// Units currently tracked, for inspection between frames.
    pub fn tracked_units(&self) -> &[arena_state::TrackedUnit] {
        self.tracker.units()
    }

    /// Joystick axis calibration statistic over the run so far.
    pub fn axis_stats(&self) -> Option<(f64, f64)> {
        self.joystick.axis_stats()
    }
}

fn crop_gray(image: &GrayImage, rect: arena_data::Rect) -> GrayImage {
    image::imageops::crop_imm(image, rect.x as u32, rect.y as u32, rect.w, rect.h).to_image()
}

/// A frame-sequential analysis session: one analyzer plus the
/// append-only status log.
pub struct Session {
    analyzer: FrameAnalyzer,
    log: StatusLog,
}

impl Session {
    pub fn new(analyzer: FrameAnalyzer) -> Self {
        Self {
            analyzer,
            log: StatusLog::new(),
        }
    }

    /// Analyze one frame and append exactly one record to the log.
    pub fn process_frame(&mut self, frame: &RgbaImage, ts: i64) -> FrameStatus {
        let status = self.analyzer.analyze(frame, ts);
        info!(
            "ts={}ms money={} units={} joystick={}",
            status.ts,
            status.money,
            status.units.len(),
            status
                .joystick_angle
                .map_or_else(|| "undetected".to_string(), |a| format!("{:.1}", a)),
        );
        self.log.push(status.clone());
        status
    }

    pub fn log(&self) -> &StatusLog {
        &self.log
    }

    pub fn into_log(self) -> StatusLog {
        self.log
    }

    pub fn axis_stats(&self) -> Option<(f64, f64)> {
        self.analyzer.axis_stats()
    }
}
