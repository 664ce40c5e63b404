//! Pre-commit hook installation.
//!
//! The installed script only shells out to `notecrypt hook check`. When the
//! binary is not on `PATH` the script lets the commit through, the same
//! fail-open stance [`CommitGate`](crate::gate::CommitGate) takes on its own
//! internal errors.

use crate::error::{NoteCryptError, Result};
use crate::git::GitRepo;
use crate::permissions;
use std::fs;
use std::path::{Path, PathBuf};

pub const HOOK_NAME: &str = "pre-commit";

/// Line identifying a hook this tool wrote
pub const HOOK_MARKER: &str = "# notecrypt pre-commit hook";

const EXECUTABLE: u32 = 0o755;

pub fn hook_script() -> String {
    format!(
        r#"#!/bin/sh
{HOOK_MARKER}
# Installed by `notecrypt hook install`; remove with `notecrypt hook uninstall`.
if ! command -v notecrypt >/dev/null 2>&1; then
    echo "notecrypt not found on PATH; skipping sensitive data validation" >&2
    exit 0
fi
exec notecrypt hook check
"#
    )
}

/// Whether the file at `path` was written by [`install_hook`]
fn is_ours(path: &Path) -> Result<bool> {
    Ok(fs::read_to_string(path)?.lines().any(|line| line.trim() == HOOK_MARKER))
}

/// Write the pre-commit hook and return its path.
///
/// A hook of ours is refreshed in place; any other existing hook is only
/// replaced when `force` is set.
pub fn install_hook(repo: &GitRepo, force: bool) -> Result<PathBuf> {
    let hooks_dir = repo.hooks_dir()?;
    fs::create_dir_all(&hooks_dir)?;

    let path = hooks_dir.join(HOOK_NAME);
    if path.exists() && !force && !is_ours(&path)? {
        return Err(NoteCryptError::HookExists(path));
    }

    fs::write(&path, hook_script())?;
    permissions::set_mode(&path, EXECUTABLE)?;

    tracing::info!(path = %path.display(), "installed pre-commit hook");
    Ok(path)
}

/// Remove the pre-commit hook if this tool installed it
pub fn uninstall_hook(repo: &GitRepo) -> Result<PathBuf> {
    let path = repo.hooks_dir()?.join(HOOK_NAME);
    if !path.exists() {
        return Err(NoteCryptError::HookNotInstalled);
    }
    if !is_ours(&path)? {
        return Err(NoteCryptError::ForeignHook(path));
    }

    fs::remove_file(&path)?;
    tracing::info!(path = %path.display(), "removed pre-commit hook");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use tempfile::TempDir;

    fn repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let git = GitRepo::open(temp.path()).unwrap();
        (temp, git)
    }

    #[test]
    fn test_install_writes_script() {
        let (_temp, git) = repo();
        let path = install_hook(&git, false).unwrap();

        assert_eq!(path, git.git_dir().join("hooks").join("pre-commit"));
        let script = fs::read_to_string(&path).unwrap();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(HOOK_MARKER));
        assert!(script.contains("notecrypt hook check"));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_is_executable() {
        use std::os::unix::fs::PermissionsExt;
        let (_temp, git) = repo();
        let path = install_hook(&git, false).unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[test]
    fn test_reinstall_own_hook() {
        let (_temp, git) = repo();
        install_hook(&git, false).unwrap();
        install_hook(&git, false).unwrap();
    }

    #[test]
    fn test_foreign_hook_needs_force() {
        let (_temp, git) = repo();
        let hooks = git.hooks_dir().unwrap();
        fs::create_dir_all(&hooks).unwrap();
        fs::write(hooks.join("pre-commit"), "#!/bin/sh\nrun-linter\n").unwrap();

        assert!(matches!(install_hook(&git, false), Err(NoteCryptError::HookExists(_))));
        assert!(matches!(uninstall_hook(&git), Err(NoteCryptError::ForeignHook(_))));

        install_hook(&git, true).unwrap();
        uninstall_hook(&git).unwrap();
        assert!(!hooks.join("pre-commit").exists());
    }

    #[test]
    fn test_uninstall_missing() {
        let (_temp, git) = repo();
        assert!(matches!(uninstall_hook(&git), Err(NoteCryptError::HookNotInstalled)));
    }
}
