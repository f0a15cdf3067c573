use crate::model::{ClasspathEntry, Report};
use serde_json::Value;

/// Renders a backend report of unknown shape as markdown.
pub fn report_markdown(title: &str, report: &Report) -> String {
    let mut lines = vec![format!("## {}", title), String::new()];

    match report.value() {
        Value::Null => lines.push("_no data_".to_string()),
        Value::Object(fields) => {
            for (key, value) in fields {
                field_lines(&mut lines, &humanize(key), value);
            }
        }
        Value::Array(items) => bullet_lines(&mut lines, items),
        scalar => lines.push(inline(scalar)),
    }

    let mut md = lines.join("\n");
    md.push('\n');
    md
}

fn field_lines(lines: &mut Vec<String>, label: &str, value: &Value) {
    match value {
        Value::Array(items) if items.is_empty() => {
            lines.push(format!("* **{}:** none", label));
        }
        Value::Array(items) => {
            lines.extend([String::new(), format!("#### {}", label), String::new()]);
            bullet_lines(lines, items);
        }
        Value::Object(fields) if fields.is_empty() => {
            lines.push(format!("* **{}:** none", label));
        }
        Value::Object(fields) => {
            lines.extend([String::new(), format!("#### {}", label), String::new()]);
            lines.extend(
                fields
                    .iter()
                    .map(|(key, inner)| format!("* **{}:** {}", key, inline(inner))),
            );
        }
        scalar => lines.push(format!("* **{}:** {}", label, inline(scalar))),
    }
}

fn bullet_lines(lines: &mut Vec<String>, items: &[Value]) {
    lines.extend(items.iter().map(|item| format!("* {}", inline(item))));
}

fn inline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(items) => items.iter().map(inline).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// `unreferencedClasses` -> `unreferenced classes`
fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else if c == '_' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

pub fn classpath_markdown(entries: &[ClasspathEntry]) -> String {
    let mut md = String::from("## Class path\n\n");
    if entries.is_empty() {
        md.push_str("_empty_\n");
    }
    for entry in entries {
        md.push_str(&format!("* **{}** `{}`", entry.label, entry.full_path));
        if !entry.active {
            md.push_str(" _(not analysed)_");
        }
        md.push('\n');
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_report() {
        let report = Report(json!({
            "unreferencedClasses": ["de.example.Unused"],
            "unreferencedJars": [],
            "rarelyUsedJars": {"gson.jar": ["de.example.Json"]},
            "total": 3
        }));
        let md = report_markdown("Unreferenced", &report);

        assert!(md.starts_with("## Unreferenced"));
        assert!(md.contains("#### unreferenced classes"));
        assert!(md.contains("* de.example.Unused"));
        assert!(md.contains("* **unreferenced jars:** none"));
        assert!(md.contains("* **gson.jar:** de.example.Json"));
        assert!(md.contains("* **total:** 3"));
    }

    #[test]
    fn test_report_layout() {
        let report = Report(json!({"missing": ["a.B"], "total": 1}));
        assert_eq!(
            report_markdown("Missing", &report),
            "## Missing\n\n\n#### missing\n\n* a.B\n* **total:** 1\n"
        );
    }

    #[test]
    fn test_null_report() {
        let md = report_markdown("Metrics", &Report(Value::Null));
        assert!(md.contains("_no data_"));
    }

    #[test]
    fn test_classpath_marks_inactive_entries() {
        let entries = vec![
            ClasspathEntry {
                label: "main".into(),
                full_path: "/p/build/classes".into(),
                active: true,
                node_id: Some("0".into()),
            },
            ClasspathEntry {
                label: "junit.jar".into(),
                full_path: "/m2/junit.jar".into(),
                active: false,
                node_id: None,
            },
        ];
        let md = classpath_markdown(&entries);

        assert!(md.contains("* **main** `/p/build/classes`\n"));
        assert!(md.contains("* **junit.jar** `/m2/junit.jar` _(not analysed)_"));
    }
}
