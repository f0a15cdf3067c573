//! The single in-memory model of what the viewer currently displays.

use crate::model::{ClasspathEntry, GraphSnapshot, ListMode, Report};
use crate::present::PanelAction;

pub const NOTHING_SELECTED_YET: &str = "Nothing selected yet. Click on a node or arc to select it.";
pub const NOTHING_SELECTED: &str = "nothing selected";

/// What the detail panel is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelSubject {
    Nothing,
    Node(String),
    Arc(String),
}

/// Rendered content of the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub subject: PanelSubject,
    pub markup: String,
    pub actions: Vec<PanelAction>,
}

impl DetailPanel {
    pub fn message(text: &str) -> Self {
        Self {
            subject: PanelSubject::Nothing,
            markup: text.to_string(),
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Graph,
    Classpath,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// List mode of the node under inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedMode {
    pub node_id: String,
    pub mode: ListMode,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reports {
    pub unreferenced: Option<Report>,
    pub missing: Option<Report>,
    pub metrics: Option<Report>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub snapshot: GraphSnapshot,
    pub selected_node: Option<String>,
    /// True while layout is animating; auto-fit stays off until it clears.
    pub zoom_locked: bool,
    pub active_filters: Vec<String>,
    pub list_mode: Option<InspectedMode>,
    pub panel: DetailPanel,
    pub project_name: Option<String>,
    pub classpath: Vec<ClasspathEntry>,
    pub reports: Reports,
    pub page: Page,
    pub scroll_offset: u32,
    notifications: Vec<Notification>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            snapshot: GraphSnapshot::default(),
            selected_node: None,
            zoom_locked: true,
            active_filters: Vec::new(),
            list_mode: None,
            panel: DetailPanel::message(NOTHING_SELECTED_YET),
            project_name: None,
            classpath: Vec::new(),
            reports: Reports::default(),
            page: Page::Graph,
            scroll_offset: 0,
            notifications: Vec::new(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    /// Drops the selection but leaves the detail panel as it is.
    pub fn deselect(&mut self) {
        self.selected_node = None;
        self.list_mode = None;
    }

    /// Clears the selection and whatever detail it showed.
    pub fn clear_selection(&mut self, message: &str) {
        self.deselect();
        self.panel = DetailPanel::message(message);
    }

    /// Selects `id`. The list mode of a previously inspected node does not carry over.
    pub fn select(&mut self, id: &str) {
        if self.list_mode.as_ref().is_some_and(|m| m.node_id != id) {
            self.list_mode = None;
        }
        self.selected_node = Some(id.to_string());
    }

    pub fn show_graph_page(&mut self) {
        self.page = Page::Graph;
        self.scroll_offset = 0;
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        self.notifications.push(Notification {
            severity,
            message: message.into(),
        });
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
