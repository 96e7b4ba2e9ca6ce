//! tiered-doc CLI
//!
//! Entry point for the `tiered-doc` command-line tool.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;
use tiered_doc::pipeline::DEFAULT_OUTPUT;
use tiered_doc::{split_sections, Pipeline, PipelineConfig, PipelineOutcome, SourceLayout, Tier};

#[derive(Parser)]
#[command(name = "tiered-doc")]
#[command(about = "Resolve tiered guidance into one context document", version)]
struct Cli {
    /// Verbose logs and provenance comments in the output
    #[arg(long, global = true, env = "TIERED_DOC_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve all tiers and write (or preview) the context document
    Resolve {
        /// Project directory (default: current directory)
        #[arg(long, short = 'p')]
        project: Option<PathBuf>,

        /// Universal material root (default: ~/.config/tiered-doc/universal)
        #[arg(long, short = 'u')]
        universal: Option<PathBuf>,

        /// Output file name relative to the project directory
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
        output: String,

        /// Developer whose individual overrides are applied
        #[arg(long, env = "TIERED_DOC_USER")]
        username: Option<String>,

        /// Active role (overrides the project config)
        #[arg(long, short = 'r')]
        role: Option<String>,

        /// Write a report and preview instead of the document
        #[arg(long)]
        dry_run: bool,

        /// Write even when policy violations were detected
        #[arg(long)]
        force: bool,

        /// Replace the destination with write-then-rename
        #[arg(long)]
        atomic: bool,

        /// Print the change report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a markdown file into sections and list them
    Sections {
        /// Markdown file
        file: PathBuf,

        /// Tier to attribute the sections to
        #[arg(long, short = 't', default_value = "universal")]
        tier: Tier,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    tiered_doc::logging::init(cli.debug);

    match cli.command {
        Commands::Resolve {
            project,
            universal,
            output,
            username,
            role,
            dry_run,
            force,
            atomic,
            json,
        } => {
            let config = PipelineConfig {
                project_dir: project.unwrap_or_else(|| PathBuf::from(".")),
                universal_root: universal.unwrap_or_else(SourceLayout::default_universal_root),
                output_name: output,
                username,
                role,
                dry_run,
                acknowledge_violations: force,
                provenance: cli.debug,
                atomic,
            };
            run_resolve(config, json);
        }
        Commands::Sections { file, tier, json } => {
            run_sections(&file, tier, json);
        }
    }
}

fn run_resolve(config: PipelineConfig, json_output: bool) {
    let outcome = match Pipeline::new(config).run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if json_output {
        match outcome.report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_summary(&outcome);
    }
}

fn print_summary(outcome: &PipelineOutcome) {
    for tier in Tier::ORDER {
        let supplied = outcome.resolution.supplied.get(&tier).copied().unwrap_or(0);
        println!("  {:<13} {} sections", format!("{}:", tier), supplied);
    }
    println!();

    for line in outcome.report.summary_lines() {
        println!("  {}", line);
    }
    if !outcome.resolution.role_removed.is_empty() {
        println!("  Filtered by role: {}", outcome.resolution.role_removed.join(", "));
    }
    println!();

    if let Some(ref artifacts) = outcome.dry_run {
        println!("Dry run complete. No changes were made.");
        println!("  Report: {}", artifacts.report.display());
        println!("  Preview: {}", artifacts.preview.display());
        if outcome.report.has_violations() {
            println!();
            println!("Policy violations were detected; a commit will be blocked unless --force is given.");
        }
    }

    if let Some(ref written) = outcome.written {
        println!(
            "Wrote {} ({} sections)",
            written.path.display(),
            outcome.sections().len()
        );
        if let Some(ref backup) = written.backup {
            println!("  Backup: {}", backup.display());
        }
    }
}

fn run_sections(file: &PathBuf, tier: Tier, json_output: bool) {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            process::exit(2);
        }
    };

    let sections: Vec<_> = split_sections(&text)
        .into_iter()
        .map(|raw| raw.into_section(tier))
        .collect();

    if json_output {
        match serde_json::to_string_pretty(&sections) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if sections.is_empty() {
        println!("No sections found in {}.", file.display());
        return;
    }

    println!("Sections in {} ({} total):\n", file.display(), sections.len());
    for section in &sections {
        println!(
            "  {}{} [{}]",
            "  ".repeat(usize::from(section.level().saturating_sub(1))),
            section.identity(),
            section.fingerprint().short(12)
        );
    }
}
