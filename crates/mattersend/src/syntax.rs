//! Fence-tag detection and MIME lookup.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

/// `mime.types` files consulted by [`MimeTypes::system`], lowest priority first.
const SYSTEM_MIME_FILES: &[&str] = &[
    "/etc/mime.types",
    "/etc/httpd/mime.types",
    "/etc/apache2/mime.types",
    "/usr/local/etc/mime.types",
];

const EXTENSION_SYNTAX: &[(&str, &str)] = &[
    ("mk", "makefile"),
    ("json", "json"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("ts", "typescript"),
    ("css", "css"),
    ("m", "objectivec"),
    ("py", "python"),
    ("xml", "xml"),
    ("html", "html"),
    ("htm", "html"),
    ("pl", "perl"),
    ("pm", "perl"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("php", "php"),
    ("phtml", "php"),
    ("coffee", "coffeescript"),
    ("cs", "cs"),
    ("c", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("cpp", "cpp"),
    ("h", "cpp"),
    ("hh", "cpp"),
    ("hpp", "cpp"),
    ("sql", "sql"),
    ("go", "go"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("java", "java"),
    ("ini", "ini"),
    ("toml", "toml"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("tex", "latex"),
    ("latex", "latex"),
    ("patch", "diff"),
];

const MIME_SYNTAX: &[(&str, &str)] = &[
    ("text/x-diff", "diff"),
    ("text/x-patch", "diff"),
    ("application/json", "json"),
    ("application/javascript", "javascript"),
    ("application/x-javascript", "javascript"),
    ("text/javascript", "javascript"),
    ("text/x-python", "python"),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("text/html", "html"),
    ("text/css", "css"),
    ("text/x-perl", "perl"),
    ("text/x-sh", "bash"),
    ("application/x-sh", "bash"),
    ("text/x-c", "cpp"),
    ("text/x-csrc", "cpp"),
    ("text/x-chdr", "cpp"),
    ("text/x-c++src", "cpp"),
    ("text/x-c++hdr", "cpp"),
    ("application/sql", "sql"),
    ("application/x-sql", "sql"),
    ("application/x-ruby", "ruby"),
    ("text/x-java-source", "java"),
    ("text/markdown", "markdown"),
    ("application/x-latex", "latex"),
];

const FILENAME_SYNTAX: &[(&str, &str)] = &[
    ("Makefile", "makefile"),
    ("makefile", "makefile"),
    ("GNUmakefile", "makefile"),
    (".htaccess", "apache"),
    ("httpd.conf", "apache"),
    ("nginx.conf", "nginx"),
    ("Dockerfile", "dockerfile"),
    ("Gemfile", "ruby"),
    ("Rakefile", "ruby"),
    ("Vagrantfile", "ruby"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, tag)| *tag)
}

/// Picks a fence tag for a file: extension first, then MIME type, then the bare file name.
pub fn detect_syntax(file_name: &str, mime: Option<&str>) -> Option<&'static str> {
    let by_ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| lookup(EXTENSION_SYNTAX, &ext.to_ascii_lowercase()));

    by_ext
        .or_else(|| mime.and_then(|m| lookup(MIME_SYNTAX, m)))
        .or_else(|| lookup(FILENAME_SYNTAX, file_name))
}

/// How the fence tag for an attached file is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyntaxChoice {
    #[default]
    Auto,
    /// Attach the raw content without a code fence.
    None,
    Tag(String),
}

impl FromStr for SyntaxChoice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "auto" => SyntaxChoice::Auto,
            "none" | "plain" => SyntaxChoice::None,
            tag => SyntaxChoice::Tag(tag.to_string()),
        })
    }
}

impl fmt::Display for SyntaxChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxChoice::Auto => f.write_str("auto"),
            SyntaxChoice::None => f.write_str("none"),
            SyntaxChoice::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Extension → MIME type database.
///
/// Entries come from `mime.types` tables; when `guess` is set, extensions missing
/// from the tables fall through to the `mime_guess` database.
#[derive(Debug, Clone, Default)]
pub struct MimeTypes {
    by_ext: HashMap<String, String>,
    guess: bool,
}

impl MimeTypes {
    /// System `mime.types` files plus the built-in `mime_guess` table.
    pub fn system() -> Self {
        let mut db = Self {
            by_ext: HashMap::new(),
            guess: true,
        };
        for file in SYSTEM_MIME_FILES {
            match fs::read_to_string(file) {
                Ok(contents) => {
                    debug!(file, "loaded mime types");
                    db.extend_from_table(&contents);
                }
                Err(_) => continue,
            }
        }
        db
    }

    /// Only the entries of a `mime.types`-format table; no built-in fallback.
    pub fn from_table(contents: &str) -> Self {
        let mut db = Self::default();
        db.extend_from_table(contents);
        db
    }

    /// Lines are `type/subtype ext1 ext2 ...`; `#` starts a comment.
    pub fn extend_from_table(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut words = line.split_whitespace();
            let Some(mime) = words.next() else { continue };
            for ext in words {
                self.by_ext
                    .insert(ext.trim_start_matches('.').to_ascii_lowercase(), mime.to_string());
            }
        }
    }

    pub fn lookup(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if let Some(mime) = self.by_ext.get(&ext) {
            return Some(mime.clone());
        }
        if self.guess {
            return mime_guess::from_ext(&ext)
                .first()
                .map(|m| m.essence_str().to_string());
        }
        None
    }
}
