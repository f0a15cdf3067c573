//! Terminal styling for shell and command output

use crate::state::{Notification, Severity};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Print an error message to stderr
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

/// Print a warning message to stderr
pub fn warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

/// Print a success message to stdout
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print a hint message to stderr (dimmed)
pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".dimmed(), msg.dimmed());
}

pub fn header(msg: &str) {
    println!("{}", msg.cyan().bold());
}

pub fn status(msg: &str) {
    println!("{} {}", "→".blue(), msg);
}

pub fn notification(note: &Notification) {
    match note.severity {
        Severity::Warning => warning(&note.message),
        Severity::Error => error(&note.message),
    }
}

/// Format a path for display (bright white)
pub fn path(p: &std::path::Path) -> String {
    p.display().to_string().bright_white().to_string()
}

/// Format a label-value pair
pub fn metric(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {}: {}", label.dimmed(), value.to_string().cyan())
}

pub fn url(u: &str) -> String {
    u.bright_blue().underline().to_string()
}

/// The shell prompt, showing the selected node if any.
pub fn prompt(selected: Option<&str>) -> String {
    match selected {
        Some(id) => format!("{} {} ", format!("knotview[{}]", id).cyan(), ">".bold()),
        None => format!("{} {} ", "knotview".cyan(), ">".bold()),
    }
}

/// Render markdown to the terminal with colors and formatting.
/// If not a TTY, writes plain markdown.
pub fn render_markdown(markdown: &str, output: &mut dyn Write) -> io::Result<()> {
    if io::stdout().is_terminal() {
        let skin = create_skin();
        let rendered = skin.term_text(markdown);
        writeln!(output, "{}", rendered)
    } else {
        writeln!(output, "{}", markdown)
    }
}

fn create_skin() -> termimad::MadSkin {
    use crossterm::style::Color;
    use termimad::*;

    let mut skin = MadSkin::default();

    skin.set_headers_fg(Color::Cyan);
    skin.bold.set_fg(Color::White);
    skin.bullet = StyledChar::from_fg_char(Color::Blue, '•');
    skin.inline_code.set_fg(Color::Yellow);

    // Used for "(not analysed)" classpath entries
    skin.italic.set_fg(Color::DarkGrey);

    skin.horizontal_rule = StyledChar::from_fg_char(Color::DarkGrey, '─');

    skin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_selection() {
        colored::control::set_override(false);
        assert_eq!(prompt(Some("12")), "knotview[12] > ");
        assert_eq!(prompt(None), "knotview > ");
    }
}
