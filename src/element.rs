//! Display tree produced by the renderer.
//!
//! The tree is presentation-agnostic: it says *what* to show (code text, a
//! chip, a table, an error) and leaves mounting and styling to the consumer.
//! It serializes with a `kind` tag so a page can mount it as JSON.

use serde::Serialize;
use serde_json::Value;

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Inline text.
    Text { text: String },
    /// Inline monospace span.
    Code { children: Vec<Element> },
    /// Inline bold text.
    Bold { text: String },
    /// Inline sequence with no wrapper of its own.
    Fragment { children: Vec<Element> },
    /// Starts on its own line.
    Block { children: Vec<Element> },
    /// Block shifted right one level.
    Indent { children: Vec<Element> },
    /// Lines shown with whitespace preserved.
    Preformatted { lines: Vec<String> },
    /// Small labelled status indicator.
    Chip { label: String, tone: Tone },
    /// Child carrying a hover description.
    Annotated { label: String, child: Box<Element> },
    Table { rows: Vec<Row> },
    /// Visible substitute for a subtree that could not be rendered.
    Error { code: String, message: String },
    /// Figure handed verbatim to a charting collaborator.
    Chart { data: Value, layout: Value, config: Value },
    /// Child with a stable identity among its siblings.
    Keyed { key: String, child: Box<Element> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Neutral,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTORS
// ————————————————————————————————————————————————————————————————————————————

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Bold { text: text.into() }
    }

    pub fn code(children: Vec<Element>) -> Self {
        Self::Code { children }
    }

    /// Monospace span holding a single piece of text.
    pub fn code_text(text: impl Into<String>) -> Self {
        Self::Code { children: vec![Self::text(text)] }
    }

    pub fn fragment(children: Vec<Element>) -> Self {
        Self::Fragment { children }
    }

    pub fn block(children: Vec<Element>) -> Self {
        Self::Block { children }
    }

    pub fn indent(children: Vec<Element>) -> Self {
        Self::Indent { children }
    }

    pub fn chip(label: impl Into<String>, tone: Tone) -> Self {
        Self::Chip { label: label.into(), tone }
    }

    pub fn annotated(label: impl Into<String>, child: Element) -> Self {
        Self::Annotated { label: label.into(), child: Box::new(child) }
    }

    pub fn table(rows: Vec<Row>) -> Self {
        Self::Table { rows }
    }

    pub fn keyed(key: impl Into<String>, child: Element) -> Self {
        Self::Keyed { key: key.into(), child: Box::new(child) }
    }

    /// Split pre-formatted text on newlines.
    pub fn preformatted(text: &str) -> Self {
        Self::Preformatted { lines: text.split('\n').map(str::to_owned).collect() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Walks the tree depth-first and collects every error element.
    pub fn errors(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_errors(&mut out);
        out
    }

    fn collect_errors<'a>(&'a self, out: &mut Vec<&'a Element>) {
        match self {
            Self::Error { .. } => out.push(self),
            Self::Code { children }
            | Self::Fragment { children }
            | Self::Block { children }
            | Self::Indent { children } => {
                for child in children {
                    child.collect_errors(out);
                }
            }
            Self::Annotated { child, .. } | Self::Keyed { child, .. } => child.collect_errors(out),
            Self::Table { rows } => {
                for cell in rows.iter().flat_map(|row| &row.cells) {
                    cell.collect_errors(out);
                }
            }
            Self::Text { .. }
            | Self::Bold { .. }
            | Self::Preformatted { .. }
            | Self::Chip { .. }
            | Self::Chart { .. } => {}
        }
    }
}

impl From<RenderError> for Element {
    fn from(err: RenderError) -> Self {
        tracing::warn!(code = err.code(), "{err}");
        Self::Error { code: err.code().to_owned(), message: err.to_string() }
    }
}

impl Row {
    pub fn new(key: impl Into<String>, cells: Vec<Element>) -> Self {
        Self { key: key.into(), cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preformatted_keeps_blank_and_indented_lines() {
        let el = Element::preformatted("a\n  b\n\nc");
        assert_eq!(
            el,
            Element::Preformatted { lines: vec!["a".into(), "  b".into(), "".into(), "c".into()] }
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let el = Element::chip("TRUE", Tone::Success);
        assert_eq!(
            serde_json::to_value(&el).unwrap(),
            json!({"kind": "chip", "label": "TRUE", "tone": "success"})
        );
    }

    #[test]
    fn errors_are_found_in_nested_tables() {
        let err: Element = RenderError::DepthExceeded { limit: 3 }.into();
        let tree = Element::table(vec![Row::new("x", vec![Element::bold("x"), err.clone()])]);
        assert_eq!(tree.errors(), vec![&err]);
    }
}
