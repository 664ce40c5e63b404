use notecrypt::{Config, LeakScanner, Result};
use std::path::Path;

/// Scan explicit paths; exit code 1 when any error-severity finding exists
pub fn scan(config: &Config, paths: &[String], json: bool) -> Result<i32> {
    let files: Vec<String> = paths.iter().map(|p| root_relative(&config.root, p)).collect();

    let scanner = LeakScanner::new(config)?;
    let result = scanner.validate(&files)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_clean() {
        println!("No sensitive data issues found in {} file(s)", files.len());
    } else {
        if result.has_errors() {
            println!("Errors:\n");
            print!("{}", result.render_errors());
        }
        if result.has_warnings() {
            println!("Warnings:\n");
            print!("{}", result.render_warnings());
        }
        println!(
            "{} error(s), {} warning(s)",
            result.errors().count(),
            result.warnings().count()
        );
    }

    Ok(if result.has_errors() { 1 } else { 0 })
}

/// Express `path` relative to `root`, in the slash form git reports
fn root_relative(root: &Path, path: &str) -> String {
    let relative = Path::new(path)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
        .replace('\\', "/");

    match relative.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => relative,
    }
}
