//! Writers that turn an [`Element`] tree into terminal text or an HTML fragment.
use colored::{ColoredString, Colorize};
use serde_json::json;

use crate::element::{Element, Row, Tone};

const INDENT: &str = "    ";
const CELL_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    /// ANSI colors through `colored`.
    Ansi,
}

// ————————————————————————————————————————————————————————————————————————————
// TEXT
// ————————————————————————————————————————————————————————————————————————————

pub fn to_text(element: &Element, style: Style) -> String {
    let mut writer = TextWriter::new(style);
    writer.write(element);
    writer.finish()
}

struct TextWriter {
    out: String,
    style: Style,
    indent: usize,
    line_start: bool,
    in_code: bool,
}

impl TextWriter {
    fn new(style: Style) -> Self {
        Self { out: String::new(), style, indent: 0, line_start: true, in_code: false }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    fn write(&mut self, element: &Element) {
        match element {
            Element::Text { text } => {
                let painted = self.paint(text, |s| if s.in_code { Some(text.cyan()) } else { None });
                self.push(&painted);
            }
            Element::Code { children } => {
                let outer = std::mem::replace(&mut self.in_code, true);
                self.write_all(children);
                self.in_code = outer;
            }
            Element::Bold { text } => {
                let painted = self.paint(text, |_| Some(text.bold()));
                self.push(&painted);
            }
            Element::Fragment { children } => self.write_all(children),
            Element::Keyed { child, .. } | Element::Annotated { child, .. } => self.write(child),
            Element::Block { children } => {
                self.break_line();
                self.write_all(children);
                self.break_line();
            }
            Element::Indent { children } => {
                self.break_line();
                self.indent += 1;
                self.write_all(children);
                self.break_line();
                self.indent -= 1;
            }
            Element::Preformatted { lines } => {
                self.break_line();
                for line in lines {
                    self.push(line);
                    self.newline();
                }
            }
            Element::Chip { label, tone } => {
                let text = format!("[{label}]");
                let painted = self.paint(&text, |_| Some(tone_color(&text, *tone)));
                self.push(&painted);
            }
            Element::Table { rows } => {
                self.break_line();
                for row in rows {
                    self.write_row(row);
                    self.break_line();
                }
            }
            Element::Error { message, .. } => {
                let text = format!("error: {message}");
                let painted = self.paint(&text, |_| Some(text.red().bold()));
                self.push(&painted);
            }
            Element::Chart { data, .. } => {
                let traces = data.as_array().map_or(0, Vec::len);
                self.push(&format!("<chart: {traces} traces>"));
            }
        }
    }

    fn write_all(&mut self, children: &[Element]) {
        for child in children {
            self.write(child);
        }
    }

    /// Cells side by side; a multi-line cell continues one level deeper.
    fn write_row(&mut self, row: &Row) {
        for (i, cell) in row.cells.iter().enumerate() {
            let text = to_text(cell, self.style);
            let text = text.trim_end();
            if i > 0 {
                self.push(CELL_GAP);
            }
            for (j, line) in text.lines().enumerate() {
                if j > 0 {
                    self.newline();
                    self.indent += 1;
                    self.push(line);
                    self.indent -= 1;
                } else {
                    self.push(line);
                }
            }
        }
    }

    fn paint(&self, text: &str, ansi: impl FnOnce(&Self) -> Option<ColoredString>) -> String {
        match (self.style, ansi(self)) {
            (Style::Ansi, Some(colored)) => colored.to_string(),
            _ => text.to_owned(),
        }
    }

    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.line_start {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.line_start = false;
        }
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.line_start = true;
    }

    fn break_line(&mut self) {
        if !self.line_start {
            self.newline();
        }
    }
}

fn tone_color(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Success => text.green(),
        Tone::Error => text.red(),
        Tone::Warning => text.yellow(),
        Tone::Info => text.blue(),
        Tone::Neutral => text.normal(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HTML
// ————————————————————————————————————————————————————————————————————————————

pub fn to_html(element: &Element) -> String {
    let mut out = String::new();
    write_html(element, &mut out);
    out
}

fn write_html(element: &Element, out: &mut String) {
    match element {
        Element::Text { text } => out.push_str(&escape(text)),
        Element::Code { children } => wrap(out, "<code>", children, "</code>"),
        Element::Bold { text } => {
            out.push_str("<b>");
            out.push_str(&escape(text));
            out.push_str("</b>");
        }
        Element::Fragment { children } => children.iter().for_each(|child| write_html(child, out)),
        Element::Block { children } => wrap(out, "<div>", children, "</div>"),
        Element::Indent { children } => wrap(out, r#"<div class="indent">"#, children, "</div>"),
        Element::Preformatted { lines } => {
            out.push_str(r#"<div class="preformatted">"#);
            for line in lines {
                out.push_str(r#"<div style="white-space: pre">"#);
                out.push_str(&escape(line));
                out.push_str("</div>");
            }
            out.push_str("</div>");
        }
        Element::Chip { label, tone } => {
            out.push_str(&format!(r#"<span class="chip {}">{}</span>"#, tone_class(*tone), escape(label)));
        }
        Element::Annotated { label, child } => {
            out.push_str(&format!(r#"<span title="{}">"#, escape(label)));
            write_html(child, out);
            out.push_str("</span>");
        }
        Element::Table { rows } => {
            out.push_str("<table><tbody>");
            for row in rows {
                out.push_str(&format!(r#"<tr data-key="{}">"#, escape(&row.key)));
                for cell in &row.cells {
                    out.push_str("<td>");
                    write_html(cell, out);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }
        Element::Error { code, message } => {
            out.push_str(&format!(
                r#"<div class="alert error" data-code="{}">{}</div>"#,
                escape(code),
                escape(message)
            ));
        }
        Element::Chart { data, layout, config } => {
            let figure = json!({ "data": data, "layout": layout, "config": config });
            out.push_str(&format!(r#"<div class="chart" data-figure="{}"></div>"#, escape(&figure.to_string())));
        }
        Element::Keyed { child, .. } => write_html(child, out),
    }
}

fn wrap(out: &mut String, open: &str, children: &[Element], close: &str) {
    out.push_str(open);
    for child in children {
        write_html(child, out);
    }
    out.push_str(close);
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "success",
        Tone::Error => "error",
        Tone::Warning => "warning",
        Tone::Info => "info",
        Tone::Neutral => "neutral",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
