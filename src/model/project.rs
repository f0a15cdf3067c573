use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of the analysed class path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClasspathEntry {
    pub label: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

fn default_active() -> bool {
    true
}

/// A structured analysis report. Its shape belongs to the backend; the viewer
/// only hands it to the report presenter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(pub Value);

impl Report {
    pub fn value(&self) -> &Value {
        &self.0
    }
}
