//! Send messages and file attachments to Mattermost/Slack incoming webhooks.

pub mod builder;
pub mod cli;
pub mod config;
pub mod emoji;
pub mod error;
pub mod message;
pub mod orchestrator;
pub mod sender;
pub mod syntax;
pub mod tabular;

pub use builder::{build, FormatOptions, SourceFile};
pub use config::{Config, Section};
pub use error::{Error, Result};
pub use message::{Attachment, Field, Message};
pub use orchestrator::{send, SendRequest};
pub use sender::Sender;
pub use syntax::MimeTypes;
