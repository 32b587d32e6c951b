use attribution_notices::output::DEFAULT_MARKDOWN_FILE;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "attribution-notices")]
#[command(about = "Generate third-party license notices from an installed node_modules tree")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Options for the default `generate` command
    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the notices report (default)
    Generate(GenerateArgs),
}

#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// Output format: md, json or both (anything else writes nothing)
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        default_value = "md",
        num_args = 0..=1,
        default_missing_value = "md"
    )]
    pub format: String,

    /// Markdown output file, relative to the project root
    #[arg(
        short,
        long,
        default_value = DEFAULT_MARKDOWN_FILE,
        num_args = 0..=1,
        default_missing_value = DEFAULT_MARKDOWN_FILE
    )]
    pub out: PathBuf,

    /// Comma-separated license identifiers whose full text is embedded (overrides config)
    #[arg(long, value_name = "IDS", num_args = 0..=1)]
    pub include_texts: Option<Option<String>>,

    /// Start the project root search here instead of the current directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Show detailed information
    #[arg(short, long)]
    pub verbose: bool,

    /// Show errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateArgs {
    /// `None` when the requested format is not one of the known ones
    pub fn output_format(&self) -> Option<OutputFormat> {
        OutputFormat::from_str(&self.format, true).ok()
    }

    /// The `--include-texts` list, if one was given with a value
    pub fn include_texts_override(&self) -> Option<&str> {
        self.include_texts.as_ref().and_then(|list| list.as_deref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Md,
    Json,
    Both,
}

impl OutputFormat {
    pub fn writes_markdown(self) -> bool {
        matches!(self, OutputFormat::Md | OutputFormat::Both)
    }

    pub fn writes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// Remove `--long` options the command does not define, along with the value
/// that follows one when it is not itself an option.
///
/// Returns the remaining arguments and the dropped option names. Everything
/// after a bare `--` is left alone.
pub fn drop_unknown_options(args: Vec<OsString>) -> (Vec<OsString>, Vec<String>) {
    let known = known_long_options();
    let mut kept = Vec::with_capacity(args.len());
    let mut dropped = Vec::new();
    let mut args = args.into_iter().peekable();

    if let Some(program) = args.next() {
        kept.push(program);
    }

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy();
        if text == "--" {
            kept.push(arg);
            kept.extend(args.by_ref());
            break;
        }

        let option = match text.strip_prefix("--") {
            Some(rest) if !rest.is_empty() => rest,
            _ => {
                kept.push(arg);
                continue;
            }
        };

        let (name, inline_value) = match option.split_once('=') {
            Some((name, _)) => (name, true),
            None => (option, false),
        };
        if known.contains(name) {
            kept.push(arg);
            continue;
        }

        dropped.push(format!("--{}", name));
        if !inline_value {
            let takes_next = args
                .peek()
                .map(|next| !next.to_string_lossy().starts_with('-'))
                .unwrap_or(false);
            if takes_next {
                args.next();
            }
        }
    }

    (kept, dropped)
}

fn known_long_options() -> HashSet<String> {
    let command = Cli::command();
    let mut known: HashSet<String> = ["help", "version"].iter().map(|s| s.to_string()).collect();
    let commands = std::iter::once(&command).chain(command.get_subcommands());
    for cmd in commands {
        for arg in cmd.get_arguments() {
            if let Some(long) = arg.get_long() {
                known.insert(long.to_string());
            }
        }
    }
    known
}
