//! Rule 6: pull absolutely positioned elements back into the flow.

use super::{RuleContext, force_each};
use crate::dom::{Dom, NodeId};
use crate::error::Result;

const IN_FLOW: &[(&str, &str)] = &[("position", "relative"), ("left", "auto"), ("right", "auto")];

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let positioned: Vec<NodeId> = dom
        .elements()
        .into_iter()
        .filter(|&id| {
            dom.inline_style(id)
                .get("position")
                .is_some_and(|p| p.eq_ignore_ascii_case("absolute"))
        })
        .collect();
    Ok(force_each(dom, cx, &positioned, IN_FLOW))
}
