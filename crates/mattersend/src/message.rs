//! Webhook payload model.
//!
//! `Message` and `Attachment` mirror the incoming-webhook schema shared by
//! Mattermost and Slack. Optional fields that are unset or empty are left out
//! of the serialized JSON entirely.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "is_blank")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub icon_url: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel: Option<impl Into<String>>) -> Self {
        self.channel = channel.map(Into::into);
        self
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Canonical JSON body: keys sorted alphabetically, 4-space indentation.
    pub fn payload(&self) -> Result<String> {
        let value = canonicalize(serde_json::to_value(self)?);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;

        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// A rich attachment. `text` and `fallback` always carry the same content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    fallback: String,
    text: String,
    #[serde(skip_serializing_if = "is_blank")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field>,
}

impl Attachment {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fallback: text.clone(),
            text,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Replaces both the rendered text and its fallback.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.fallback = self.text.clone();
    }

    pub fn add_field(&mut self, title: impl Into<String>, value: impl Into<String>, short: bool) {
        self.fields.push(Field {
            title: title.into(),
            value: value.into(),
            short,
        });
    }

    /// Hard cut to at most `limit` characters, applied to text and fallback alike.
    pub fn truncate(&mut self, limit: usize) {
        if let Some((idx, _)) = self.text.char_indices().nth(limit) {
            self.text.truncate(idx);
            self.fallback = self.text.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Rebuilds every object with its keys in sorted order, whatever map
/// implementation `serde_json` was compiled with.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
