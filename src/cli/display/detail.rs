//! Key-value detail view for a single agent or tool.

use colored::Colorize;

use super::colors::{label, section_header};

/// A builder for detail views.
///
/// Fields are aligned on the widest key across all sections.
pub struct DetailView {
    title: String,
    sections: Vec<Section>,
}

#[derive(Default)]
struct Section {
    header: Option<String>,
    fields: Vec<(String, String)>,
    lines: Vec<String>,
}

impl DetailView {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: vec![Section::default()],
        }
    }

    /// Add a key-value field to the current section.
    #[must_use]
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        if let Some(section) = self.sections.last_mut() {
            section.fields.push((key.to_string(), value.into()));
        }
        self
    }

    /// Add a field only if the value is present.
    #[must_use]
    pub fn field_opt(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Start a new section with a header.
    #[must_use]
    pub fn section(mut self, header: &str) -> Self {
        self.sections.push(Section {
            header: Some(header.to_string()),
            ..Section::default()
        });
        self
    }

    /// Add free text to the current section, indented line by line.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        if let Some(section) = self.sections.last_mut() {
            section.lines.extend(text.lines().map(str::to_string));
        }
        self
    }

    /// Add a bullet item to the current section.
    #[must_use]
    pub fn item(self, text: &str) -> Self {
        let bullet = format!("{} {text}", "\u{2022}".dimmed());
        self.text(&bullet)
    }

    pub fn render(&self) -> String {
        let key_width = self
            .sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .map(|(k, _)| k.len())
            .max()
            .unwrap_or(0);

        let mut lines = vec![self.title.bold().to_string()];
        for section in &self.sections {
            if let Some(header) = &section.header {
                lines.push(section_header(header));
            }
            for (key, value) in &section.fields {
                let padding = " ".repeat(key_width - key.len());
                lines.push(format!("  {}{padding}  {value}", label(key)));
            }
            for line in &section.lines {
                lines.push(format!("  {line}"));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_and_skips_missing_fields() {
        colored::control::set_override(false);
        let view = DetailView::new("Agent")
            .field("ID", "a1")
            .field("Framework", "Langchain")
            .field_opt("Model", None::<String>)
            .section("System Prompt")
            .text("line one\nline two")
            .render();

        assert_eq!(
            view,
            "Agent\n  ID:         a1\n  Framework:  Langchain\n\nSystem Prompt\n  line one\n  line two"
        );
    }
}
