//! `cwrap check`: validate a class table without generating anything

use anyhow::{bail, Context, Result};
use cwrap::{load_table, ClassTable};
use std::path::PathBuf;

/// Run the check command with the given arguments
pub fn run(args: &[String]) -> Result<()> {
    let path = parse(args)?;
    let table = load_table(&path)
        .with_context(|| format!("Failed to load class table {}", path.display()))?;

    println!("{}: {}", path.display(), summary(&table));
    Ok(())
}

fn parse(args: &[String]) -> Result<PathBuf> {
    match args {
        [path] if !path.starts_with('-') => Ok(PathBuf::from(path)),
        [] => bail!("check requires a class table (cwrap check <table.json>)"),
        [arg] => bail!("Unknown flag: {}", arg),
        [_, extra, ..] => bail!("Unexpected argument: {}", extra),
    }
}

/// One-line overview of a valid table
fn summary(table: &ClassTable) -> String {
    let views = table.iter().filter(|c| c.is_type_subclass()).count();
    let functions: usize = table.iter().map(|c| c.functions().count()).sum();
    format!(
        "{} classes ({} tag-based views), {} functions",
        table.len(),
        views,
        functions
    )
}
