//! Template rendering for outgoing messages.
//!
//! Strings may reference captured values with `{{vars.KEY}}`, which
//! HTML-escapes the value the way mustache does, or with `{{{vars.KEY}}}`,
//! which inserts it verbatim. Dotted keys walk into object values:
//! `{{vars.address.city}}`. Unknown keys and non-`vars` placeholders render
//! empty.

use crate::MessageBody;
use colloquy_core::{OutgoingMessage, Values, render_value};
use colloquy_error::{ColloquyResult, ScriptError, ScriptErrorKind};
use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use serde_json::Value;

/// Triple braces capture group 1 (raw), double braces group 2 (escaped).
const PLACEHOLDER: &str = r"\{\{\{\s*([^{}\s]+)\s*\}\}\}|\{\{\s*([^{}\s]+)\s*\}\}";

/// Fills placeholders in text and JSON payloads.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    placeholder: Regex,
}

impl TemplateRenderer {
    /// Compile the placeholder grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern fails to compile.
    pub fn new() -> ColloquyResult<Self> {
        let placeholder = Regex::new(PLACEHOLDER).map_err(|e| {
            ScriptError::new(ScriptErrorKind::InvalidPattern {
                pattern: PLACEHOLDER.to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(Self { placeholder })
    }

    /// Substitute every placeholder in `template`.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_conversation::TemplateRenderer;
    /// use colloquy_core::Values;
    /// use serde_json::json;
    ///
    /// let renderer = TemplateRenderer::new().unwrap();
    /// let mut values = Values::new();
    /// values.insert("name".to_string(), json!("Ada"));
    ///
    /// assert_eq!(renderer.render_text("Hello {{vars.name}}", &values), "Hello Ada");
    /// assert_eq!(renderer.render_text("Hello {{vars.name}}", &Values::new()), "Hello ");
    /// ```
    pub fn render_text(&self, template: &str, values: &Values) -> String {
        self.placeholder
            .replace_all(template, |caps: &Captures<'_>| {
                match (caps.get(1), caps.get(2)) {
                    (Some(raw), _) => lookup(raw.as_str(), values),
                    (None, Some(escaped)) => html_escape(&lookup(escaped.as_str(), values)),
                    (None, None) => String::new(),
                }
            })
            .into_owned()
    }

    /// Render every string leaf of a JSON tree, depth first.
    pub fn render_tree(&self, tree: &Value, values: &Values) -> Value {
        match tree {
            Value::String(s) => Value::String(self.render_text(s, values)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.render_tree(v, values)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.render_tree(v, values)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Build the outgoing message for a line body.
    ///
    /// Lines with quick replies always use their first text variant; other lines
    /// pick one variant at random. Text, attachments and the `attachments` /
    /// `attachment` entries of the channel data are rendered.
    pub fn make_outgoing<R: Rng + ?Sized>(
        &self,
        body: &MessageBody,
        values: &Values,
        rng: &mut R,
    ) -> OutgoingMessage {
        let variant = if body.quick_replies().is_empty() {
            body.text().choose(rng)
        } else {
            body.text().first()
        };
        let text = variant.map(|t| self.render_text(t, values)).unwrap_or_default();

        let mut channel_data = body.channel_data().clone();
        for key in ["attachments", "attachment"] {
            if let Some(payload) = channel_data.get_mut(key) {
                *payload = self.render_tree(payload, values);
            }
        }

        OutgoingMessage {
            text,
            suggested_actions: body.quick_replies().clone(),
            attachments: body
                .attachments()
                .as_ref()
                .map(|a| self.render_tree(a, values)),
            channel_data,
        }
    }
}

/// Mustache's escape set.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('/', "&#x2F;")
        .replace('`', "&#x60;")
        .replace('=', "&#x3D;")
}

fn lookup(reference: &str, values: &Values) -> String {
    let Some(path) = reference.strip_prefix("vars.") else {
        return String::new();
    };
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return String::new();
    };
    let mut current = match values.get(first) {
        Some(value) => value,
        None => return String::new(),
    };
    for segment in segments {
        current = match current.get(segment) {
            Some(value) => value,
            None => return String::new(),
        };
    }
    render_value(current)
}
