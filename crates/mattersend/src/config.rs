use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

const DEFAULT_CONFIG_NAME: &str = "mattersend.toml";

/// Base layer every named section is merged on top of.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    sections: BTreeMap<String, Section>,
}

/// One config table; also used for call-time overrides.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub url: Option<String>,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub icon: Option<String>,
}

impl Section {
    /// Values set in `upper` win over ours.
    pub fn overlay(self, upper: &Section) -> Section {
        fn pick(upper: &Option<String>, lower: Option<String>) -> Option<String> {
            upper.clone().filter(|v| !v.is_empty()).or(lower)
        }
        Section {
            url: pick(&upper.url, self.url),
            channel: pick(&upper.channel, self.channel),
            username: pick(&upper.username, self.username),
            icon: pick(&upper.icon, self.icon),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or merge the standard locations.
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = path_override {
            return Self::read(path);
        }

        let mut config = Config::default();
        for path in search_paths() {
            if path.is_file() {
                config.merge(Self::read(&path)?);
            }
        }
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg = Self::parse(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), sections = cfg.sections.len(), "loaded config");
        Ok(cfg)
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Section-wise merge; keys set in `other` win.
    pub fn merge(&mut self, other: Config) {
        for (name, section) in other.sections {
            let merged = self
                .sections
                .remove(&name)
                .unwrap_or_default()
                .overlay(&section);
            self.sections.insert(name, merged);
        }
    }

    /// `[DEFAULT]` overlaid with the named section, then with call-time overrides.
    pub fn resolve(&self, name: &str, overrides: &Section) -> Result<Section> {
        let base = self.sections.get(DEFAULT_SECTION).cloned().unwrap_or_default();
        let named = if name == DEFAULT_SECTION {
            Section::default()
        } else {
            self.sections
                .get(name)
                .cloned()
                .ok_or_else(|| Error::Config(format!("section '{name}' not found in config")))?
        };
        Ok(base.overlay(&named).overlay(overrides))
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc").join(DEFAULT_CONFIG_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(DEFAULT_CONFIG_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{DEFAULT_CONFIG_NAME}")));
    }
    if let Some(local) = find_upwards(DEFAULT_CONFIG_NAME) {
        paths.push(local);
    }
    paths
}

fn find_upwards(file_name: &str) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[DEFAULT]
url = "https://chat.mydomain.com/hooks/abcdefghi123456"

[angrybot]
icon = ":angry:"
username = "AngryBot"
"#;

    #[test]
    fn load_config_success() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        let section = cfg.resolve("angrybot", &Section::default()).unwrap();
        assert_eq!(
            section.url.as_deref(),
            Some("https://chat.mydomain.com/hooks/abcdefghi123456")
        );
        assert_eq!(section.username.as_deref(), Some("AngryBot"));
        assert_eq!(section.icon.as_deref(), Some(":angry:"));
        assert_eq!(section.channel, None);
    }

    #[test]
    fn missing_section_errors() {
        let cfg = Config::parse(SAMPLE).unwrap();
        assert_matches!(cfg.resolve("does_not_exist", &Section::default()), Err(Error::Config(_)));
        // DEFAULT need not exist
        assert!(Config::default().resolve(DEFAULT_SECTION, &Section::default()).is_ok());
    }

    #[test]
    fn precedence_override_section_default() {
        let cfg = Config::parse(
            r#"[DEFAULT]
url = "https://a/hooks/1"
channel = "general"
username = "base"

[ops]
url = "https://b/hooks/2"
username = ""
"#,
        )
        .unwrap();

        let resolved = cfg.resolve("ops", &Section::default()).unwrap();
        assert_eq!(resolved.url.as_deref(), Some("https://b/hooks/2"));
        assert_eq!(resolved.channel.as_deref(), Some("general"));
        // an empty value does not mask the layer below
        assert_eq!(resolved.username.as_deref(), Some("base"));

        let overrides = Section {
            url: Some("http://chat.net/hooks/abdegh12".into()),
            ..Default::default()
        };
        let resolved = cfg.resolve("ops", &overrides).unwrap();
        assert_eq!(resolved.url.as_deref(), Some("http://chat.net/hooks/abdegh12"));
    }

    #[test]
    fn merge_files_later_wins() {
        let mut cfg = Config::parse("[DEFAULT]\nurl = \"https://old/hooks/x\"\nchannel = \"a\"\n").unwrap();
        cfg.merge(Config::parse("[DEFAULT]\nurl = \"https://new/hooks/y\"\n").unwrap());
        let resolved = cfg.resolve(DEFAULT_SECTION, &Section::default()).unwrap();
        assert_eq!(resolved.url.as_deref(), Some("https://new/hooks/y"));
        assert_eq!(resolved.channel.as_deref(), Some("a"));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[DEFAULT\nurl = 1").unwrap();
        assert_matches!(Config::load(Some(file.path())), Err(Error::ConfigParse { path, .. }) if path == file.path());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(Config::parse("[DEFAULT]\nhook = \"x\"\n").is_err());
    }
}
