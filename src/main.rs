//! mailframe - render archived newsletters for sandboxed preview

use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mailframe::dom::parse_document;
use mailframe::encoding::decode_bytes;
use mailframe::layout::{NormalizeMode, NormalizeReport, StaticProbe, normalize};
use mailframe::{DocumentBuilder, SanitizeReport, repair_encoding};

#[derive(Parser)]
#[command(name = "mailframe")]
#[command(version, about = "Render newsletter HTML for a sandboxed iframe", long_about = None)]
#[command(after_help = "EXAMPLES:
    mailframe mail.html -o preview.html       Sanitize into a standalone document
    mailframe mail.html --normalize           Also apply the layout rules
    mailframe mail.html --preview 320 --report  Fit to a 320px card, print what changed")]
struct Cli {
    /// Newsletter HTML file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Add the mobile scale rule to the stylesheet
    #[arg(long)]
    mobile: bool,

    /// Apply the preview layout rules for a frame of this width
    #[arg(long, value_name = "WIDTH")]
    preview: Option<f32>,

    /// Apply the reading-view layout rules
    #[arg(long, conflicts_with = "preview")]
    normalize: bool,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Encoding to try when the input is not valid UTF-8
    #[arg(long, value_name = "LABEL")]
    charset: Option<String>,

    /// Print the sanitize/layout reports as JSON
    #[arg(long)]
    report: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    sanitize: Option<&'a SanitizeReport>,
    layout: Option<&'a NormalizeReport>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> mailframe::Result<()> {
    let bytes = fs::read(&cli.input)?;
    let text = decode_bytes(&bytes, cli.charset.as_deref());
    let repaired = repair_encoding(Some(&text));

    let assembled = DocumentBuilder::new()
        .title(cli.title.as_deref())
        .mobile(cli.mobile)
        .build(Some(&repaired));
    let mut html = assembled.html;

    let mode = match cli.preview {
        Some(viewport_width) => Some(NormalizeMode::Preview { viewport_width }),
        None if cli.normalize => Some(NormalizeMode::Detail),
        None => None,
    };
    let layout = mode.map(|mode| {
        let mut dom = parse_document(&html);
        let report = normalize(&mut dom, mode, &StaticProbe::new(cli.preview));
        html = dom.to_html();
        report
    });

    match &cli.output {
        Some(path) => fs::write(path, &html)?,
        None => print!("{html}"),
    }
    debug!(bytes = html.len(), "document written");

    if cli.report {
        let report = Report {
            input: &cli.input,
            sanitize: assembled.report.as_ref(),
            layout: layout.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report).map_err(io::Error::from)?;
        // Keep stdout clean when it carries the document.
        if cli.output.is_some() {
            println!("{json}");
        } else {
            eprintln!("{json}");
        }
    }

    if !cli.quiet
        && let Some(path) = &cli.output
    {
        let removed = assembled.report.as_ref().map_or(0, SanitizeReport::removals);
        eprintln!("{} -> {path} ({removed} elements/attributes removed)", cli.input);
    }

    Ok(())
}
