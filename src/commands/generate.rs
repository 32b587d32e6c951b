use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::cli::{GenerateArgs, OutputFormat};
use attribution_notices::config::{find_project_root, load_config, ConfigFileOutcome};
use attribution_notices::license::resolve_license_texts;
use attribution_notices::matcher::ExcludeSet;
use attribution_notices::output::{render_markdown, NoticesExport, JSON_EXPORT_FILE};
use attribution_notices::scanner::{scan_dependency_tree, DEPENDENCY_DIR};

pub fn handle_generate(args: GenerateArgs) -> Result<()> {
    let quiet = args.quiet;
    let verbose = args.verbose && !quiet;

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let start = match &args.dir {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };
    let project_root = find_project_root(&start);

    // Load configuration, then let the command line override it
    let loaded = load_config(&project_root);
    if verbose {
        match &loaded.outcome {
            ConfigFileOutcome::Absent => {
                eprintln!("No {} found, using defaults", display_name(&loaded.path))
            }
            ConfigFileOutcome::Applied => eprintln!("Using {}", loaded.path.display()),
            ConfigFileOutcome::Ignored { reason } => {
                eprintln!("Ignoring {} ({}), using defaults", loaded.path.display(), reason)
            }
        }
    }
    let config = match args.include_texts_override() {
        Some(list) => loaded.config.with_include_texts(list),
        None => loaded.config,
    };

    let dependency_root = project_root.join(DEPENDENCY_DIR);
    if !dependency_root.is_dir() {
        eprintln!("✖ node_modules not found. Run npm ci / pnpm i / yarn install first.");
        std::process::exit(2);
    }

    let exclude = ExcludeSet::new(&config.exclude);
    let scan = scan_dependency_tree(&dependency_root, &exclude);
    if verbose {
        eprintln!(
            "Found {} packages in {} ({} entries skipped)",
            scan.packages.len(),
            dependency_root.display(),
            scan.skipped.len()
        );
        for skipped in &scan.skipped {
            eprintln!("  skipped {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    let texts = resolve_license_texts(&scan.packages, &project_root, &config.include_texts);
    if verbose {
        for id in &texts.missing {
            eprintln!("No license text template for {}, omitting", id);
        }
    }

    let format = args.output_format();
    if format.is_none() && !quiet {
        eprintln!("Unknown format '{}', nothing written (expected md, json or both)", args.format);
    }
    let generated_at = Utc::now();

    if format.is_some_and(OutputFormat::writes_markdown) {
        let markdown = render_markdown(&scan.packages, &texts, &config, generated_at);
        let path = project_root.join(&args.out);
        fs::write(&path, markdown)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            println!("✓ Wrote {}", args.out.display());
        }
    }

    if format.is_some_and(OutputFormat::writes_json) {
        let json = NoticesExport::new(&scan.packages, &texts, &config, generated_at).to_json()?;
        let path = project_root.join(JSON_EXPORT_FILE);
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            println!("✓ Wrote {}", JSON_EXPORT_FILE);
        }
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
