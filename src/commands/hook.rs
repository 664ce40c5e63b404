use notecrypt::hook::{install_hook, uninstall_hook};
use notecrypt::{CommitGate, Config, GitRepo, Result};
use std::path::Path;

/// Run the commit gate; returns the hook exit code.
///
/// Without `--root`, the repository's working directory is the notes root so
/// staged paths line up with files on disk.
pub fn hook_check(root: Option<&Path>) -> Result<i32> {
    let repo = match GitRepo::open(".") {
        Ok(repo) => repo,
        Err(e) => {
            // Nothing to guard outside a repository
            tracing::warn!(error = %e, "hook check outside a git repository");
            println!("Not in a git repository, skipping validation");
            return Ok(0);
        }
    };

    let loaded = match root {
        Some(root) => Config::load(Some(root)),
        None => repo.workdir().and_then(|workdir| Config::load(Some(workdir))),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not load configuration, allowing commit");
            println!("Warning: could not load configuration: {e}");
            println!("   Allowing commit to proceed");
            return Ok(0);
        }
    };

    let report = CommitGate::new(config, repo).evaluate();
    print!("{}", report.output);
    Ok(report.verdict.exit_code())
}

pub fn hook_install(force: bool) -> Result<()> {
    let repo = GitRepo::open(".")?;
    let path = install_hook(&repo, force)?;

    println!("Installed pre-commit hook: {}", path.display());
    println!("\nStaged notes are now checked for unencrypted sensitive data on every commit.");
    println!("Make sure 'notecrypt' is on your PATH; the hook is skipped when it is not.");
    Ok(())
}

pub fn hook_uninstall() -> Result<()> {
    let repo = GitRepo::open(".")?;
    let path = uninstall_hook(&repo)?;
    println!("Removed pre-commit hook: {}", path.display());
    Ok(())
}
