use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use uifix::plan::{apply_plan, load_from_path, FixOutcome};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "uifix")]
#[command(about = "Autofix engine for UI framework source artifacts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply fix plans to a source tree
    Apply {
        /// Root directory of the source tree
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Specific plan file to apply (otherwise applies all in <root>/fixplans/)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Compute changes without writing any file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Validate plan files without touching sources
    Validate {
        /// Plan files to check
        plans: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            root,
            plan,
            dry_run,
            diff,
        } => cmd_apply(root, plan, dry_run, diff),
        Commands::Validate { plans } => cmd_validate(plans),
    }
}

/// Discover all .json plan files in `<root>/fixplans`.
fn discover_plan_files(root: &Path) -> Result<Vec<PathBuf>> {
    let plans_dir = root.join("fixplans");
    let mut files = Vec::new();

    if plans_dir.exists() {
        for entry in WalkDir::new(&plans_dir).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some("json")
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .json plan files found in {}", plans_dir.display());
    }
    Ok(files)
}

/// Show a unified diff between original and patched content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(root: PathBuf, plan: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let root = root.canonicalize()?;
    let plan_files = match plan {
        Some(path) => vec![path],
        None => discover_plan_files(&root)?,
    };

    println!("Root: {}", root.display());
    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    let mut total_applied = 0;
    let mut total_nothing = 0;
    let mut total_failed = 0;

    for plan_file in plan_files {
        println!("Loading plan from {}...", plan_file.display());
        let config = load_from_path(&plan_file)?;

        // Capture the targeted files up front so the diff has a baseline.
        let mut before: HashMap<PathBuf, String> = HashMap::new();
        if show_diff {
            let targets: HashSet<PathBuf> =
                config.fixes.iter().map(|fix| root.join(&fix.file)).collect();
            for path in targets {
                if let Ok(content) = fs::read_to_string(&path) {
                    before.insert(path, content);
                }
            }
        }

        let results = apply_plan(&config, &root, dry_run);

        let mut changed_files: Vec<PathBuf> = Vec::new();
        for (fix_id, outcome) in results {
            match outcome {
                FixOutcome::Applied { file } => {
                    let verb = if dry_run { "Would apply to" } else { "Applied to" };
                    println!("{} {}: {} {}", "✓".green(), fix_id, verb, file.display());
                    total_applied += 1;
                    if !changed_files.contains(&file) {
                        changed_files.push(file);
                    }
                }
                FixOutcome::NothingToDo { file, reason } => {
                    println!(
                        "{} {}: Nothing to do in {} ({})",
                        "⊙".yellow(),
                        fix_id,
                        file.display(),
                        reason.dimmed()
                    );
                    total_nothing += 1;
                }
                FixOutcome::Failed { file, reason } => {
                    eprintln!("{} {}: Failed - {}", "✗".red(), fix_id, reason);
                    eprintln!("  File: {}", file.display());
                    total_failed += 1;
                }
            }
        }

        if show_diff && !dry_run {
            for file in changed_files {
                if let (Some(original), Ok(patched)) =
                    (before.get(&file), fs::read_to_string(&file))
                {
                    if original != &patched {
                        display_diff(&file, original, &patched);
                    }
                }
            }
        }

        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!("  {} nothing to do", format!("{}", total_nothing).yellow());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_validate(plans: Vec<PathBuf>) -> Result<()> {
    if plans.is_empty() {
        anyhow::bail!("No plan files given");
    }

    let mut invalid = 0;
    for path in plans {
        match load_from_path(&path) {
            Ok(config) => {
                println!(
                    "{} {}: {} fixes",
                    "✓".green(),
                    path.display(),
                    config.fixes.len()
                );
            }
            Err(error) => {
                eprintln!("{} {}:", "✗".red(), path.display());
                eprintln!("{error}");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}
