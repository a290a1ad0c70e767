//! Layout normalization of a rendered newsletter.
//!
//! Newsletters are built for fixed-width mail clients: 600px tables,
//! floated columns, absolutely positioned blocks. Once the document is in
//! the frame, a battery of rules forces them into a centered, responsive
//! layout by writing inline `!important` declarations.
//!
//! ## Rule Order
//!
//! 1. **Body** - center the body, raise tiny font sizes
//! 2. **Wrapper** - center `.newsletter-wrapper`
//! 3. **Containers** - center common container classes/ids
//! 4. **Tables** - center tables, turn fixed widths into max-widths
//! 5. **Text** - center block text, break long words
//! 6. **Position** - neutralize `position: absolute`
//! 7. **Fit** - scale the body down to the viewport (preview only)
//! 8. **Snapshot** - unclamp and reveal content (preview only)
//!
//! Every rule queries the DOM afresh and only ever writes fixed values, so
//! running the battery again leaves the style attributes unchanged.

mod body;
mod containers;
mod fit;
mod position;
mod probe;
mod snapshot;
mod table;
mod text;

pub use probe::{LayoutProbe, StaticProbe};

use tracing::{debug, warn};

use crate::dom::{Dom, NodeId, Selectors};
use crate::error::{Error, Result};

/// Which battery to run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum NormalizeMode {
    /// Full-size reading view: rules 1-6.
    Detail,
    /// Thumbnail/card preview: rules 1-8, fitted to `viewport_width`.
    Preview { viewport_width: f32 },
}

impl NormalizeMode {
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            NormalizeMode::Detail => &Rule::DETAIL,
            NormalizeMode::Preview { .. } => &Rule::PREVIEW,
        }
    }
}

/// One rule of the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum Rule {
    BodyCentering,
    WrapperCentering,
    ContainerCentering,
    TableCentering,
    TextCentering,
    AbsolutePositionFix,
    FitToViewport,
    SnapshotVisibility,
}

impl Rule {
    pub const DETAIL: [Rule; 6] = [
        Rule::BodyCentering,
        Rule::WrapperCentering,
        Rule::ContainerCentering,
        Rule::TableCentering,
        Rule::TextCentering,
        Rule::AbsolutePositionFix,
    ];

    pub const PREVIEW: [Rule; 8] = [
        Rule::BodyCentering,
        Rule::WrapperCentering,
        Rule::ContainerCentering,
        Rule::TableCentering,
        Rule::TextCentering,
        Rule::AbsolutePositionFix,
        Rule::FitToViewport,
        Rule::SnapshotVisibility,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::BodyCentering => "body-centering",
            Rule::WrapperCentering => "wrapper-centering",
            Rule::ContainerCentering => "container-centering",
            Rule::TableCentering => "table-centering",
            Rule::TextCentering => "text-centering",
            Rule::AbsolutePositionFix => "absolute-position-fix",
            Rule::FitToViewport => "fit-to-viewport",
            Rule::SnapshotVisibility => "snapshot-visibility",
        }
    }

    fn apply(self, dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
        match self {
            Rule::BodyCentering => body::apply(dom, cx),
            Rule::WrapperCentering => containers::center_wrapper(dom, cx),
            Rule::ContainerCentering => containers::center_containers(dom, cx),
            Rule::TableCentering => table::apply(dom, cx),
            Rule::TextCentering => text::apply(dom, cx),
            Rule::AbsolutePositionFix => position::apply(dom, cx),
            Rule::FitToViewport => fit::apply(dom, cx),
            Rule::SnapshotVisibility => snapshot::apply(dom, cx),
        }
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct RuleOutcome {
    pub rule: Rule,
    /// Elements whose inline style was written.
    pub elements: usize,
    pub error: Option<String>,
}

/// What a normalization pass did.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct NormalizeReport {
    pub mode: NormalizeMode,
    pub outcomes: Vec<RuleOutcome>,
    /// Scale factor applied to the body by the fit rule.
    pub scale: Option<f32>,
}

impl NormalizeReport {
    pub fn elements_styled(&self) -> usize {
        self.outcomes.iter().map(|o| o.elements).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    pub fn outcome(&self, rule: Rule) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule == rule)
    }
}

/// State shared by the rules of one pass.
pub(crate) struct RuleContext<'a> {
    pub probe: &'a dyn LayoutProbe,
    pub mode: NormalizeMode,
    pub rule: Rule,
    pub scale: Option<f32>,
}

impl RuleContext<'_> {
    /// Width the content has to fit into.
    pub fn available_width(&self) -> Option<f32> {
        match self.mode {
            NormalizeMode::Preview { viewport_width } if viewport_width > 0.0 => {
                Some(viewport_width)
            }
            _ => self.probe.viewport_width(),
        }
    }
}

/// Run the battery for `mode` over `dom`.
///
/// A failing rule is logged and the remaining rules still run.
pub fn normalize(dom: &mut Dom, mode: NormalizeMode, probe: &dyn LayoutProbe) -> NormalizeReport {
    let mut cx = RuleContext {
        probe,
        mode,
        rule: Rule::BodyCentering,
        scale: None,
    };

    let mut outcomes = Vec::with_capacity(mode.rules().len());
    for &rule in mode.rules() {
        cx.rule = rule;
        let outcome = match rule.apply(dom, &mut cx) {
            Ok(elements) => {
                debug!(rule = rule.name(), elements, "applied layout rule");
                RuleOutcome {
                    rule,
                    elements,
                    error: None,
                }
            }
            Err(err) => {
                warn!(rule = rule.name(), %err, "layout rule failed");
                RuleOutcome {
                    rule,
                    elements: 0,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    NormalizeReport {
        mode,
        outcomes,
        scale: cx.scale,
    }
}

pub(crate) fn require_body(dom: &Dom) -> Result<NodeId> {
    dom.body()
        .ok_or_else(|| Error::DocumentUnavailable("document has no body".to_string()))
}

pub(crate) fn select(dom: &Dom, selector: &str) -> Result<Vec<NodeId>> {
    Ok(dom.select(&Selectors::compile(selector)?))
}

/// Force `properties` on one element.
pub(crate) fn force(dom: &mut Dom, id: NodeId, properties: &[(&str, &str)]) -> Result<()> {
    if !dom.is_attached(id) || !dom.force_styles(id, properties) {
        return Err(Error::Detached(id.0));
    }
    Ok(())
}

/// Force `properties` on each element, skipping the ones that fail.
pub(crate) fn force_each(
    dom: &mut Dom,
    cx: &RuleContext<'_>,
    ids: &[NodeId],
    properties: &[(&str, &str)],
) -> usize {
    let mut styled = 0;
    for &id in ids {
        match force(dom, id, properties) {
            Ok(()) => styled += 1,
            Err(err) => warn!(rule = cx.rule.name(), %err, "skipping element"),
        }
    }
    styled
}
