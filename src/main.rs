//! luadts: generate TypeScript declaration files from LuaCATS-annotated Lua.
//!
//! Three modes:
//!
//! - **stdin mode**: `luadts < physics.lua` prints declarations to stdout
//! - **build mode**: `luadts build` translates every module in `luadts.toml`
//! - **files mode**: `luadts files -o types lua/*.lua` for ad-hoc runs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use luadts::config::ModuleConfig;
use luadts::registry::Registry;
use luadts::{parser, render, Translation};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "luadts",
    about = "Generate TypeScript declaration files from LuaCATS annotations"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Output format for stdin mode: dts (default) or json
    #[arg(short = 'f', long, default_value = "dts")]
    format: String,

    /// More log output; repeat for trace level
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Translate the modules listed in a registry manifest
    Build {
        /// Registry manifest
        #[arg(short = 'c', long, default_value = "luadts.toml")]
        config: PathBuf,

        /// Override the manifest's output directory
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Only build these modules. Can be specified multiple times.
        #[arg(short = 'm', long)]
        module: Vec<String>,
    },
    /// Translate loose files without a manifest
    Files {
        /// Input files, directories or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Output directory
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Export this name from every file
        #[arg(long)]
        main_export: Option<String>,

        /// Also declare the export as a global variable
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        None => stdin_mode(&cli.format),
        Some(Command::Build {
            config,
            output,
            module,
        }) => build_mode(&config, output, &module),
        Some(Command::Files {
            files,
            output,
            main_export,
            global,
        }) => files_mode(&files, &output, main_export, global),
    }
}

/// Log to stderr. `RUST_LOG` wins over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose > 1)
        .init();
}

/// stdin mode: read Lua from stdin, print the rendered result.
fn stdin_mode(format: &str) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let renderer = render::create_renderer(format)?;
    let config = ModuleConfig::new("stdin", "<stdin>");
    if renderer.file_extension() == "json" {
        print!("{}", renderer.render(&parser::parse(&input), &config)?);
        return Ok(());
    }

    match luadts::translate(&input, &config)? {
        Translation::Declarations(text) => print!("{}", text),
        Translation::Skipped(reason) => warn!("skipped: {}", reason),
    }
    Ok(())
}

/// build mode: every registry module (or the requested ones), in registry order.
fn build_mode(config: &Path, output: Option<PathBuf>, only: &[String]) -> Result<()> {
    let mut registry = Registry::load(config)?;
    if let Some(dir) = output {
        registry.out_dir = dir;
    }

    for name in only {
        if registry.module(name).is_none() {
            anyhow::bail!("no module named `{}` in {}", name, config.display());
        }
    }
    let modules: Vec<&ModuleConfig> = registry
        .modules
        .iter()
        .filter(|m| only.is_empty() || only.contains(&m.name))
        .collect();

    fs::create_dir_all(&registry.out_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            registry.out_dir.display()
        )
    })?;

    let mut summary = Summary::default();
    for module in modules {
        let out_path = registry.output_path(module, "d.ts");
        summary.record(&module.name, run_unit(module, &out_path));
    }
    summary.finish()
}

/// files mode: one declaration file per Lua source, named after its stem.
fn files_mode(
    patterns: &[String],
    output_dir: &Path,
    main_export: Option<String>,
    global: bool,
) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let input_files = expand_globs(patterns)?;
    if input_files.is_empty() {
        anyhow::bail!("no .lua files matched");
    }

    let mut summary = Summary::default();
    for path in input_files {
        let name = derive_output_name(&path);
        let module = ModuleConfig {
            main_export: main_export.clone(),
            declare_global_var: Some(global),
            ..ModuleConfig::new(name.as_str(), path)
        };
        let out_path = output_dir.join(format!("{}.d.ts", name));
        summary.record(&name, run_unit(&module, &out_path));
    }
    summary.finish()
}

/// What happened to one module.
enum Outcome {
    Written(PathBuf),
    Skipped(String),
}

/// Read, translate and write one module.
fn run_unit(module: &ModuleConfig, out_path: &Path) -> Result<Outcome> {
    if !module.source.is_file() {
        anyhow::bail!("source not found: {}", module.source.display());
    }
    let source = fs::read_to_string(&module.source)
        .with_context(|| format!("failed to read {}", module.source.display()))?;

    match luadts::translate(&source, module)? {
        Translation::Declarations(text) => {
            fs::write(out_path, text)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            Ok(Outcome::Written(out_path.to_path_buf()))
        }
        Translation::Skipped(reason) => Ok(Outcome::Skipped(reason)),
    }
}

/// Per-run counters. A failed unit never stops the batch.
#[derive(Default)]
struct Summary {
    written: usize,
    skipped: usize,
    failed: usize,
}

impl Summary {
    fn record(&mut self, name: &str, outcome: Result<Outcome>) {
        match outcome {
            Ok(Outcome::Written(path)) => {
                info!(module = name, "wrote {}", path.display());
                self.written += 1;
            }
            Ok(Outcome::Skipped(reason)) => {
                warn!(module = name, "skipped: {}", reason);
                self.skipped += 1;
            }
            Err(e) => {
                error!(module = name, "{:#}", e);
                self.failed += 1;
            }
        }
    }

    fn finish(self) -> Result<()> {
        eprintln!(
            "{} written, {} skipped, {} failed",
            self.written, self.skipped, self.failed
        );
        if self.failed > 0 {
            anyhow::bail!("{} module(s) failed", self.failed);
        }
        Ok(())
    }
}

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned (non-recursively) for `.lua` files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            files.extend(
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|p| p.is_file() && is_lua(p)),
            );
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_lua(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("lua")
}

/// "lua/physics.lua" → "physics"
fn derive_output_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
