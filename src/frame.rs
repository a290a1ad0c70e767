//! Lifecycle of one preview iframe.
//!
//! A [`NewsletterFrame`] owns the document written into an iframe and
//! decides when the layout battery runs over it: right after the write,
//! when the frame reports `load`, and at fixed delays afterwards to catch
//! late-loading images and styles. The host drives time with
//! [`NewsletterFrame::advance`].
//!
//! Every write starts a new generation. Passes scheduled for an older
//! generation are dropped when they come due, so a pass never touches a
//! document that has been replaced or unmounted.
//!
//! ```
//! use std::time::Duration;
//! use mailframe::frame::{FrameConfig, FrameState, NewsletterFrame};
//!
//! let mut frame = NewsletterFrame::new(FrameConfig::default());
//! frame.write(Some("<table width=\"600\"><tr><td>Hi</td></tr></table>"));
//! frame.on_load();
//! frame.advance(Duration::from_millis(500));
//! assert_eq!(frame.state(), FrameState::Settled);
//! ```

use std::time::Duration;

use tracing::trace;

use crate::document::DocumentBuilder;
use crate::dom::{Dom, parse_document};
use crate::encoding::repair_encoding;
use crate::layout::{LayoutProbe, NormalizeMode, NormalizeReport, StaticProbe, normalize};
use crate::model::Newsletter;
use crate::sanitize::SanitizeReport;

/// `sandbox` attribute for the hosting iframe. Scripts stay disabled.
pub const IFRAME_SANDBOX: &str = "allow-same-origin";

/// Delays after a write at which the battery runs again.
pub const DEFAULT_PASS_DELAYS: [Duration; 2] = [Duration::from_millis(200), Duration::from_millis(500)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Nothing written, or unmounted.
    Empty,
    /// Document written, waiting for `load`.
    Writing,
    /// `load` seen, delayed passes outstanding.
    Loaded,
    /// Delayed passes have started running.
    Normalizing,
    /// All scheduled passes have run.
    Settled,
}

#[derive(Debug, Clone)]
pub struct FrameConfig {
    pub mode: NormalizeMode,
    pub is_mobile: bool,
    pub delays: Vec<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            mode: NormalizeMode::Detail,
            is_mobile: false,
            delays: DEFAULT_PASS_DELAYS.to_vec(),
        }
    }
}

impl FrameConfig {
    /// Card preview at the given width.
    pub fn preview(viewport_width: f32) -> Self {
        Self {
            mode: NormalizeMode::Preview { viewport_width },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledPass {
    generation: u64,
    due: Duration,
}

/// One iframe showing one newsletter at a time.
pub struct NewsletterFrame<P: LayoutProbe = StaticProbe> {
    config: FrameConfig,
    probe: P,
    dom: Option<Dom>,
    state: FrameState,
    generation: u64,
    clock: Duration,
    pending: Vec<ScheduledPass>,
    passes_run: usize,
    last_report: Option<NormalizeReport>,
    sanitize_report: Option<SanitizeReport>,
}

impl NewsletterFrame<StaticProbe> {
    /// Frame measured by a [`StaticProbe`] sized to the preview width.
    pub fn new(config: FrameConfig) -> Self {
        let viewport = match config.mode {
            NormalizeMode::Preview { viewport_width } => Some(viewport_width),
            NormalizeMode::Detail => None,
        };
        Self::with_probe(config, StaticProbe::new(viewport))
    }
}

impl<P: LayoutProbe> NewsletterFrame<P> {
    pub fn with_probe(config: FrameConfig, probe: P) -> Self {
        Self {
            config,
            probe,
            dom: None,
            state: FrameState::Empty,
            generation: 0,
            clock: Duration::ZERO,
            pending: Vec::new(),
            passes_run: 0,
            last_report: None,
            sanitize_report: None,
        }
    }

    /// Replace the frame's content.
    ///
    /// Blank content empties the frame. Otherwise the document is built,
    /// normalized once, and the delayed passes are scheduled.
    pub fn write(&mut self, content: Option<&str>) {
        self.write_titled(content, None);
    }

    /// Replace the frame's content with a stored newsletter, repairing its
    /// encoding first.
    pub fn write_newsletter(&mut self, newsletter: &Newsletter) {
        let repaired = newsletter
            .content
            .as_deref()
            .map(|content| repair_encoding(Some(content)));
        self.write_titled(repaired.as_deref(), newsletter.title.as_deref());
    }

    fn write_titled(&mut self, content: Option<&str>, title: Option<&str>) {
        self.generation += 1;
        self.passes_run = 0;
        self.last_report = None;

        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            self.dom = None;
            self.sanitize_report = None;
            self.state = FrameState::Empty;
            trace!(generation = self.generation, "frame emptied");
            return;
        };

        let assembled = DocumentBuilder::new()
            .title(title)
            .mobile(self.config.is_mobile)
            .build(Some(content));
        self.sanitize_report = assembled.report;
        self.dom = Some(parse_document(&assembled.html));
        self.state = FrameState::Writing;

        self.run_pass();

        let generation = self.generation;
        let now = self.clock;
        self.pending.extend(self.config.delays.iter().map(|&delay| ScheduledPass {
            generation,
            due: now + delay,
        }));
        trace!(generation, scheduled = self.config.delays.len(), "frame written");
    }

    /// The iframe fired `load`.
    pub fn on_load(&mut self) {
        if self.dom.is_none() {
            trace!("load on empty frame ignored");
            return;
        }
        self.run_pass();
        if self.pending_passes() == 0 {
            self.state = FrameState::Settled;
        } else if self.state == FrameState::Writing {
            self.state = FrameState::Loaded;
        }
    }

    /// Advance the frame clock, running every pass that comes due.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;

        let generation = self.generation;
        let before = self.pending.len();
        self.pending.retain(|pass| pass.generation == generation);
        if self.pending.len() < before {
            trace!(dropped = before - self.pending.len(), "dropped stale passes");
        }

        self.pending.sort_by_key(|pass| pass.due);
        let due = self.pending.partition_point(|pass| pass.due <= self.clock);
        if due == 0 {
            return;
        }

        let due_passes: Vec<ScheduledPass> = self.pending.drain(..due).collect();
        for pass in due_passes {
            trace!(
                generation = pass.generation,
                due_ms = pass.due.as_millis() as u64,
                "running scheduled pass"
            );
            self.state = FrameState::Normalizing;
            self.run_pass();
        }

        if self.pending.is_empty() {
            self.state = FrameState::Settled;
        }
    }

    /// Run the battery right away, e.g. after the host resized the frame.
    pub fn normalize_now(&mut self) -> Option<&NormalizeReport> {
        self.dom.as_ref()?;
        self.run_pass();
        self.last_report.as_ref()
    }

    /// Drop the document and every pending pass.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.dom = None;
        self.pending.clear();
        self.passes_run = 0;
        self.last_report = None;
        self.sanitize_report = None;
        self.state = FrameState::Empty;
    }

    fn run_pass(&mut self) {
        let Some(dom) = self.dom.as_mut() else {
            return;
        };
        let report = normalize(dom, self.config.mode, &self.probe);
        self.passes_run += 1;
        self.last_report = Some(report);
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn document(&self) -> Option<&Dom> {
        self.dom.as_ref()
    }

    /// Serialized current document.
    pub fn html(&self) -> Option<String> {
        self.dom.as_ref().map(Dom::to_html)
    }

    /// Scheduled passes of the current content that have not run yet.
    pub fn pending_passes(&self) -> usize {
        self.pending
            .iter()
            .filter(|pass| pass.generation == self.generation)
            .count()
    }

    /// Battery runs against the current content.
    pub fn passes_run(&self) -> usize {
        self.passes_run
    }

    pub fn last_report(&self) -> Option<&NormalizeReport> {
        self.last_report.as_ref()
    }

    pub fn sanitize_report(&self) -> Option<&SanitizeReport> {
        self.sanitize_report.as_ref()
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}
