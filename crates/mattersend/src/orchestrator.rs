use std::path::PathBuf;

use tracing::debug;

use crate::builder::{self, FormatOptions, SourceFile};
use crate::config::{Config, Section, DEFAULT_SECTION};
use crate::emoji;
use crate::error::Result;
use crate::sender::Sender;
use crate::syntax::MimeTypes;

/// Everything one `send` invocation needs besides the loaded config.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub message: String,
    pub file: Option<PathBuf>,
    pub config_section: String,
    /// Call-time values that win over the config file.
    pub overrides: Section,
    pub format: FormatOptions,
    pub dry_run: bool,
}

impl Default for SendRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            file: None,
            config_section: DEFAULT_SECTION.to_string(),
            overrides: Section::default(),
            format: FormatOptions::default(),
            dry_run: false,
        }
    }
}

/// Resolves settings, builds the payload and posts it.
///
/// Returns the request text in dry-run mode, `None` after a real send.
pub async fn send(config: &Config, request: &SendRequest, mime_db: &MimeTypes) -> Result<Option<String>> {
    let settings = config.resolve(&request.config_section, &request.overrides)?;
    debug!(section = %request.config_section, ?settings, "resolved settings");

    let file = request
        .file
        .as_deref()
        .map(|path| SourceFile::read(path, mime_db))
        .transpose()?;

    let mut message = builder::build(
        settings.channel.as_deref(),
        &request.message,
        file.as_ref(),
        &request.format,
    );
    message.username = settings.username.clone();
    message.icon_url = match (&settings.icon, &settings.url) {
        (Some(icon), Some(url)) => Some(emoji::icon_url(icon, url)?),
        (Some(icon), None) => Some(icon.clone()),
        (None, _) => None,
    };

    Sender::new()
        .send(&message, settings.url.as_deref(), request.dry_run)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tabular::TabularMode;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"[DEFAULT]
url = "https://chat.mydomain.com/hooks/abcdefghi123456"

[angrybot]
icon = ":angry:"
username = "AngryBot"
"#;

    fn request(message: &str) -> SendRequest {
        SendRequest {
            message: message.to_string(),
            overrides: Section {
                channel: Some("town-square".into()),
                ..Default::default()
            },
            dry_run: true,
            ..Default::default()
        }
    }

    async fn dry_run(req: &SendRequest) -> String {
        let config = Config::parse(CONFIG).unwrap();
        send(&config, req, &MimeTypes::from_table("text/x-diff diff"))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn simple_message() {
        assert_eq!(
            dry_run(&request("test message")).await,
            "POST https://chat.mydomain.com/hooks/abcdefghi123456\n{\n    \"channel\": \"town-square\",\n    \"text\": \"test message\"\n}"
        );
    }

    #[tokio::test]
    async fn named_section_sets_identity() {
        let req = SendRequest {
            config_section: "angrybot".into(),
            ..request("test message")
        };
        assert_eq!(
            dry_run(&req).await,
            r#"POST https://chat.mydomain.com/hooks/abcdefghi123456
{
    "channel": "town-square",
    "icon_url": "https://chat.mydomain.com/static/emoji/1f620.png",
    "text": "test message",
    "username": "AngryBot"
}"#
        );
    }

    #[tokio::test]
    async fn url_override() {
        let mut req = request("test message");
        req.overrides.url = Some("http://chat.net/hooks/abdegh12".into());
        assert!(dry_run(&req).await.starts_with("POST http://chat.net/hooks/abdegh12\n"));
    }

    #[tokio::test]
    async fn diff_attachment_by_mime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.diff");
        fs::write(&path, b"").unwrap();

        let req = SendRequest {
            file: Some(path),
            ..request("")
        };
        assert_eq!(
            dry_run(&req).await,
            r#"POST https://chat.mydomain.com/hooks/abcdefghi123456
{
    "attachments": [
        {
            "fallback": "```diff\n```",
            "text": "```diff\n```",
            "title": "source.diff"
        }
    ],
    "channel": "town-square",
    "text": ""
}"#
        );
    }

    #[tokio::test]
    async fn csv_attachment_with_dialect() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        fs::write(&path, b"abc,def\nfoo,bar").unwrap();

        for mode in ["sniff", "excel"] {
            let mut req = SendRequest {
                file: Some(path.clone()),
                ..request("")
            };
            req.format.tabular = mode.parse::<TabularMode>().unwrap();
            let out = dry_run(&req).await;
            assert!(
                out.contains(r#""fallback": "| abc | def |\n| --- | --- |\n| foo | bar |","#),
                "{mode}: {out}"
            );
            assert!(out.contains(r#""title": "source.csv""#));
        }
    }

    #[tokio::test]
    async fn missing_url_and_missing_file() {
        let config = Config::parse("[quiet]\nchannel = \"x\"\n").unwrap();
        let mut req = request("hi");
        req.config_section = "quiet".into();
        assert_matches!(
            send(&config, &req, &MimeTypes::default()).await,
            Err(Error::Config(_))
        );

        let req = SendRequest {
            file: Some("/nonexistent/attachment.txt".into()),
            ..request("hi")
        };
        let config = Config::parse(CONFIG).unwrap();
        assert_matches!(
            send(&config, &req, &MimeTypes::default()).await,
            Err(Error::Io { .. })
        );
    }
}
