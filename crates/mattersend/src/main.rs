use std::io::{IsTerminal, Read};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mattersend::builder::FormatOptions;
use mattersend::cli::Cli;
use mattersend::config::{Config, Section};
use mattersend::orchestrator::{send, SendRequest};
use mattersend::syntax::MimeTypes;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let message = match (cli.message, &cli.file) {
        (Some(text), _) => text,
        (None, Some(_)) => String::new(),
        (None, None) => read_stdin()?,
    };

    let request = SendRequest {
        message,
        file: cli.file,
        config_section: cli.config_section,
        overrides: Section {
            url: cli.url,
            channel: cli.channel,
            username: cli.username,
            icon: cli.icon,
        },
        format: FormatOptions {
            syntax: cli.syntax,
            tabular: cli.tabular.unwrap_or_default(),
            fileinfo: cli.fileinfo,
            ..Default::default()
        },
        dry_run: cli.dry_run,
    };

    let config = Config::load(cli.config.as_deref()).context("Loading configuration")?;
    let mime_db = MimeTypes::system();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = rt
        .block_on(send(&config, &request, &mime_db))
        .context("Sending message")?;

    if let Some(text) = output {
        println!("{text}");
    }
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Reading message from stdin, end with Ctrl-D");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text).context("Reading message from stdin")?;
    Ok(text)
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("mattersend=debug,warn"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
