//! Turns message text and an optional file into a webhook [`Message`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::message::{Attachment, Message};
use crate::syntax::{detect_syntax, MimeTypes, SyntaxChoice};
use crate::tabular::{self, TabularMode};

/// Attachment text is cut to this many characters to stay under the server's
/// post size limit.
pub const DEFAULT_ATTACHMENT_LIMIT: usize = 3500;

#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub syntax: SyntaxChoice,
    pub tabular: TabularMode,
    /// Append `Size` and `Mime` fields to the attachment.
    pub fileinfo: bool,
    pub max_length: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            syntax: SyntaxChoice::Auto,
            tabular: TabularMode::Off,
            fileinfo: false,
            max_length: DEFAULT_ATTACHMENT_LIMIT,
        }
    }
}

/// A file read into memory, ready to be attached.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    pub size: u64,
    pub mime: Option<String>,
}

impl SourceFile {
    pub fn read(path: &Path, mime_db: &MimeTypes) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: bytes.len() as u64,
            content: String::from_utf8_lossy(&bytes).into_owned(),
            mime: mime_db.lookup(path),
        })
    }
}

pub fn build(
    channel: Option<&str>,
    text: &str,
    file: Option<&SourceFile>,
    options: &FormatOptions,
) -> Message {
    let mut message = Message::new(text).with_channel(channel);
    if let Some(file) = file {
        message.attach(build_attachment(file, options));
    }
    message
}

pub fn build_attachment(file: &SourceFile, options: &FormatOptions) -> Attachment {
    let rendered = match tabular::render(&file.content, &options.tabular) {
        Some(table) => table,
        None => {
            let tag = match &options.syntax {
                SyntaxChoice::Auto => Some(
                    detect_syntax(&file.name, file.mime.as_deref())
                        .unwrap_or_default()
                        .to_string(),
                ),
                SyntaxChoice::None => None,
                SyntaxChoice::Tag(tag) => Some(tag.clone()),
            };
            debug!(file = %file.name, syntax = ?tag, "fencing attachment");
            match tag {
                Some(tag) => code_fence(&tag, &file.content),
                None => file.content.clone(),
            }
        }
    };

    let mut attachment = Attachment::new(rendered).with_title(&file.name);
    attachment.truncate(options.max_length);

    if options.fileinfo {
        attachment.add_field("Size", human_size(file.size), true);
        attachment.add_field("Mime", file.mime.as_deref().unwrap_or("None"), true);
    }
    attachment
}

fn code_fence(tag: &str, content: &str) -> String {
    format!("```{tag}\n{content}```")
}

/// Binary-unit size with one decimal place, e.g. `4.9KiB`.
pub fn human_size(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if num < 1024.0 {
            return format!("{num:.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}
