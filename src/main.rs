use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

mod cli;
mod commands;

use cli::{drop_unknown_options, Cli, Commands};
use commands::handle_generate;

fn main() -> Result<()> {
    let (argv, ignored) = drop_unknown_options(std::env::args_os().collect());
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => std::process::exit(0),
                // Unknown subcommands and unrecognised short flags
                _ => std::process::exit(1),
            }
        }
    };

    let args = match cli.command {
        Some(Commands::Generate(args)) => args,
        None => cli.generate,
    };

    if args.verbose && !args.quiet {
        for option in &ignored {
            eprintln!("Ignoring unknown option {}", option);
        }
    }

    handle_generate(args)
}
