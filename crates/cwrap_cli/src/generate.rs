//! `cwrap generate`: emit the C++ bindings for a class table

use anyhow::{bail, Context, Result};
use cwrap::{load_table, CppGenerator, GenConfig};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Run the generate command with the given arguments
pub fn run(args: &[String]) -> Result<()> {
    let cmd = GenerateCommand::parse(args)?;
    let config = cmd.config()?;

    let table = load_table(&cmd.table)
        .with_context(|| format!("Failed to load class table {}", cmd.table.display()))?;
    let bindings = CppGenerator::new(&table, &config)
        .generate()
        .context("Failed to generate bindings")?;

    match &cmd.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, &bindings)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), classes = table.len(), "wrote bindings");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(bindings.as_bytes())
                .context("Failed to write bindings to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Generate command configuration
#[derive(Debug, PartialEq)]
struct GenerateCommand {
    /// Class table to read
    table: PathBuf,
    /// Optional TOML settings file
    config: Option<PathBuf>,
    /// Output file; stdout when absent
    output: Option<PathBuf>,
    /// `--no-exceptions` was given
    no_exceptions: bool,
    /// `--no-extensions` was given
    no_extensions: bool,
}

impl GenerateCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut table = None;
        let mut cmd = GenerateCommand {
            table: PathBuf::new(),
            config: None,
            output: None,
            no_exceptions: false,
            no_extensions: false,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        cmd.config = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--config requires a value");
                    }
                }
                "--output" | "-o" => {
                    if i + 1 < args.len() {
                        cmd.output = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--output requires a value");
                    }
                }
                "--no-exceptions" => {
                    cmd.no_exceptions = true;
                    i += 1;
                }
                "--no-extensions" => {
                    cmd.no_extensions = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') => {
                    if table.is_some() {
                        bail!("Unexpected argument: {}", arg);
                    }
                    table = Some(PathBuf::from(arg));
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}", args[i]);
                }
            }
        }

        match table {
            Some(path) => cmd.table = path,
            None => bail!("generate requires a class table (cwrap generate <table.json>)"),
        }
        Ok(cmd)
    }

    /// Settings from the config file, with command line overrides applied
    fn config(&self) -> Result<GenConfig> {
        let mut config = match &self.config {
            Some(path) => GenConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GenConfig::default(),
        };
        if self.no_exceptions {
            config = config.with_exceptions(false);
        }
        if self.no_extensions {
            config = config.with_extensions(false);
        }
        Ok(config)
    }
}
