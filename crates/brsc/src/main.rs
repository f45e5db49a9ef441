//! brsc - project analysis for BrightScript projects.
//!
//! Loads a project configuration, feeds every selected file to the
//! analysis engine, and prints diagnostics with source context.
//!
//! Exit codes: 0 on success, 1 when error-severity diagnostics exist,
//! 2 on an unrecoverable engine error.

use brsc_analyzer::{EngineError, ProjectConfig, Program};
use brsc_ast::{Diagnostic, Severity};
use clap::Parser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "brsc")]
#[command(about = "Static analysis for BrightScript projects")]
struct Cli {
    /// Project root directory, or path to a brsconfig.json
    project: Option<PathBuf>,

    /// Minimum severity to print (error, warn, info, hint)
    #[arg(long, default_value = "hint")]
    min_severity: String,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brsc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<i32, EngineError> {
    let min_severity = Severity::parse(&cli.min_severity).map_err(EngineError::Config)?;
    let (mut config, root_dir) = load_config(cli.project.as_deref())?;
    if !root_dir.is_dir() {
        return Err(EngineError::InvalidProjectRoot(root_dir));
    }
    config.root_dir = Some(root_dir.clone());
    if config.watch {
        warn!("watch mode is driven by an external watcher; running a single pass");
    }

    let globs = build_globset(&config.files)?;
    let mut program = Program::new(config);
    let mut sources: HashMap<PathBuf, String> = HashMap::new();

    info!("scanning {}", root_dir.display());
    for entry in WalkDir::new(&root_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&root_dir) else {
            continue;
        };
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        if !globs.is_match(&relative_str) {
            continue;
        }
        let analyzable = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some(e) if e.eq_ignore_ascii_case("brs")
                || e.eq_ignore_ascii_case("bs")
                || e.eq_ignore_ascii_case("xml")
        );
        if !analyzable {
            continue;
        }

        debug!(file = %relative_str, "adding");
        let text = std::fs::read_to_string(path)?;
        program.set_file(path, &text)?;
        sources.insert(path.to_path_buf(), text);
    }
    info!("analyzing {} file(s)", program.file_count());

    let diagnostics = program.get_diagnostics();
    let mut error_count = 0usize;
    let mut printed = 0usize;
    for diagnostic in &diagnostics {
        if diagnostic.severity == Severity::Error {
            error_count += 1;
        }
        if diagnostic.severity <= min_severity {
            print!("{}", format_diagnostic(diagnostic, &sources));
            printed += 1;
        }
    }

    if printed > 0 {
        println!();
    }
    info!(
        "{} diagnostic(s), {} error(s)",
        diagnostics.len(),
        error_count
    );
    Ok(if error_count > 0 { 1 } else { 0 })
}

/// Resolve the configuration and project root from the CLI argument:
/// an explicit config file, a directory containing `brsconfig.json`, or a
/// bare directory analyzed with defaults.
fn load_config(project: Option<&Path>) -> Result<(ProjectConfig, PathBuf), EngineError> {
    let target = project
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if target.is_file() {
        let config = ProjectConfig::load(&target)?;
        let root = config
            .root_dir
            .clone()
            .or_else(|| target.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok((config, root));
    }

    let config_path = target.join("brsconfig.json");
    if config_path.is_file() {
        let config = ProjectConfig::load(&config_path)?;
        let root = config.root_dir.clone().unwrap_or_else(|| target.clone());
        return Ok((config, root));
    }

    Ok((ProjectConfig::default(), target))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, EngineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| EngineError::Config(format!("bad files glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| EngineError::Config(e.to_string()))
}

/// Format one diagnostic with its source line and a caret underline.
fn format_diagnostic(diagnostic: &Diagnostic, sources: &HashMap<PathBuf, String>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}[{}{}]: {}\n",
        diagnostic.severity,
        Diagnostic::SOURCE,
        diagnostic.code,
        diagnostic.message
    ));

    let line = diagnostic.range.start.line;
    let column = diagnostic.range.start.character;
    out.push_str(&format!(
        "  --> {}:{}:{}\n",
        diagnostic.file.display(),
        line + 1,
        column + 1
    ));

    if let Some(text) = sources.get(&diagnostic.file) {
        if let Some(source_line) = text.lines().nth(line as usize) {
            out.push_str("   |\n");
            out.push_str(&format!("{:3} | {}\n", line + 1, source_line));
            let width = if diagnostic.range.end.line == line {
                (diagnostic.range.end.character.saturating_sub(column)).max(1) as usize
            } else {
                source_line.len().saturating_sub(column as usize).max(1)
            };
            out.push_str(&format!(
                "   | {}{}\n",
                " ".repeat(column as usize),
                "^".repeat(width)
            ));
        }
    }

    for related in &diagnostic.related {
        out.push_str(&format!(
            "   = note: {} (at {}:{}:{})\n",
            related.message,
            related.location.path.display(),
            related.location.range.start.line + 1,
            related.location.range.start.character + 1
        ));
    }

    out
}
