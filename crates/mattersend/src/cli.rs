use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_SECTION;
use crate::syntax::SyntaxChoice;
use crate::tabular::TabularMode;

/// mattersend – send messages and files to Mattermost/Slack incoming webhooks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Activate verbose output (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Read only this config file instead of the standard locations
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Config section to use on top of [DEFAULT]
    #[arg(short = 'C', long, value_name = "SECTION", default_value = DEFAULT_SECTION)]
    pub config_section: String,

    /// Channel to post to
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Incoming webhook URL
    #[arg(short = 'U', long, env = "MATTERSEND_URL")]
    pub url: Option<String>,

    /// Username to post as
    #[arg(short, long)]
    pub username: Option<String>,

    /// Icon URL or :emoji: name
    #[arg(short, long)]
    pub icon: Option<String>,

    /// Fence tag for the attached file: auto, none or a language name.
    ///
    /// `auto` still fences files of unknown type without a tag; `none` posts
    /// the content raw.
    #[arg(short = 'y', long, default_value = "auto")]
    pub syntax: SyntaxChoice,

    /// Render the attached file as a table (sniff, excel, excel-tab, unix)
    #[arg(short, long, value_name = "DIALECT", num_args = 0..=1, default_missing_value = "sniff")]
    pub tabular: Option<TabularMode>,

    /// Attach size and MIME type of the file
    #[arg(short = 'I', long = "info")]
    pub fileinfo: bool,

    /// Print the request instead of sending it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// File to attach
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Message text; read from stdin when omitted and no file is given
    #[arg(short, long)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tabular_flag_defaults_to_sniff() {
        let cli = Cli::try_parse_from(["mattersend", "-f", "data.csv", "-t"]).unwrap();
        assert_eq!(cli.tabular, Some(TabularMode::Sniff));
        assert_eq!(cli.config_section, "DEFAULT");
        assert_eq!(cli.syntax, SyntaxChoice::Auto);

        let cli = Cli::try_parse_from(["mattersend", "--tabular", "excel-tab", "-m", "x"]).unwrap();
        assert_eq!(cli.tabular.map(|t| t.to_string()).as_deref(), Some("excel-tab"));
    }

    #[test]
    fn syntax_help_explains_raw_mode() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("`none` posts"), "{help}");
        let cli = Cli::try_parse_from(["mattersend", "-f", "mime.types", "-y", "none"]).unwrap();
        assert_eq!(cli.syntax, SyntaxChoice::None);
    }

    #[test]
    fn unknown_dialect_rejected() {
        assert!(Cli::try_parse_from(["mattersend", "--tabular", "tsv"]).is_err());
    }
}
