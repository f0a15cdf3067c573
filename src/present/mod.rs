//! Detail panel presenter: turns detail payloads into markdown plus the
//! list-mode controls the panel offers. Pure functions, no state.

mod report;

pub use report::{classpath_markdown, report_markdown};

use crate::model::{ArcDetail, ListMode, NodeDetail};
use crate::state::{DetailPanel, PanelSubject};

/// A control in the node panel. Activating it changes the list mode of the
/// inspected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelAction {
    pub label: String,
    pub mode: ListMode,
}

pub fn node_panel(detail: &NodeDetail) -> DetailPanel {
    let mut lines = vec![
        format!("### {}", escape(detail.display_name())),
        String::new(),
        format!("* **type:** {}", escape(&detail.kind)),
    ];
    if let (Some(kind), Some(name)) = (&detail.resource_type, &detail.resource_name) {
        lines.push(format!("* **found in:** {} {}", escape(kind), escape(name)));
    }
    if !detail.node_name.is_empty() && detail.node_name != detail.display_name() {
        lines.push(format!("* **full name:** {}", escape(&detail.node_name)));
    }
    lines.push(format!(
        "* **contained classes:** {}",
        detail.number_contained_classes
    ));
    lines.push(format!("* **list mode:** {}", mode_label(detail.list_mode)));

    DetailPanel {
        subject: PanelSubject::Node(detail.id.clone()),
        markup: markdown(lines),
        actions: node_actions(detail),
    }
}

fn node_actions(detail: &NodeDetail) -> Vec<PanelAction> {
    let mut actions = Vec::new();
    if !detail.is_class() {
        for mode in ListMode::NODE_MODES {
            if mode == detail.list_mode {
                continue;
            }
            let label = match mode {
                ListMode::Expanded => {
                    format!("expand ({} nodes)", detail.number_expandable)
                }
                other => mode_label(other).to_string(),
            };
            actions.push(PanelAction { label, mode });
        }
    }
    if detail.number_collapsable > 0 {
        actions.push(PanelAction {
            label: format!("collapse parent ({} nodes)", detail.number_collapsable),
            mode: ListMode::CollapseParent,
        });
    }
    actions
}

pub fn arc_panel(arc_id: &str, detail: &ArcDetail) -> DetailPanel {
    let mut lines = vec![
        format!(
            "### {} depends on {}",
            escape(detail.from.display_name()),
            escape(detail.to.display_name())
        ),
        String::new(),
        "Reason:".to_string(),
        String::new(),
        "| dependent | | dependency |".to_string(),
        "|-|-|-|".to_string(),
    ];
    lines.extend(detail.reason.iter().map(|pair| {
        format!(
            "| {} | depends on | {} |",
            escape(&pair.first),
            escape(&pair.second)
        )
    }));

    DetailPanel {
        subject: PanelSubject::Arc(arc_id.to_string()),
        markup: markdown(lines),
        actions: Vec::new(),
    }
}

/// Joins lines into a markdown block ending in a newline.
fn markdown(lines: Vec<String>) -> String {
    let mut md = lines.join("\n");
    md.push('\n');
    md
}

fn mode_label(mode: ListMode) -> &'static str {
    match mode {
        ListMode::Collapsed => "collapsed",
        ListMode::LeafsCollapsed => "leafs collapsed",
        ListMode::Expanded => "expanded",
        ListMode::CollapseParent => "collapse parent",
    }
}

/// Keeps backend-provided text from breaking table cells or emphasis.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('*', "\\*")
}
