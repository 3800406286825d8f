//! Page Templates
//!
//! HTML pages are parsed once at startup into literal and placeholder
//! segments; rendering only substitutes `{{name}}` placeholders with
//! HTML-escaped values.

use std::borrow::Cow;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Template parse failures
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {template}: unclosed placeholder at byte {offset}")]
    Unclosed { template: &'static str, offset: usize },

    #[error("template {template}: invalid placeholder name {name:?} at byte {offset}")]
    InvalidName {
        template: &'static str,
        name: String,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(String),
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: &'static str,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: &'static str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or(TemplateError::Unclosed {
                template: name,
                offset: offset + start,
            })?;

            let var = after_open[..end].trim();
            if var.is_empty() || !var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TemplateError::InvalidName {
                    template: name,
                    name: var.to_string(),
                    offset: offset + start,
                });
            }
            segments.push(Segment::Var(var.to_string()));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render with the given variables. Unknown placeholders render empty.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(var) => {
                    if let Some((_, value)) = vars.iter().find(|(key, _)| *key == var.as_str()) {
                        out.push_str(&escape_html(value));
                    } else {
                        tracing::debug!(template = self.name, var = %var, "Unbound placeholder");
                    }
                }
            }
        }
        out
    }
}

fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// All pages served by the relay
#[derive(Debug, Clone)]
pub struct Pages {
    pub chat: Template,
    pub login: Template,
}

impl Pages {
    /// Parse the bundled page templates
    pub fn load() -> Result<Self, TemplateError> {
        Ok(Self {
            chat: Template::parse("chat.html", include_str!("../../../templates/chat.html"))?,
            login: Template::parse("login.html", include_str!("../../../templates/login.html"))?,
        })
    }
}
