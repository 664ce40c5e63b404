use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

/// Key size used by integration tests; 4096-bit generation is too slow for CI
#[allow(dead_code)]
pub const TEST_BITS: &str = "2048";

/// Run a git command in `dir`, panicking on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> std::process::Output {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Create a new temporary git repository with user config set.
pub fn create_git_repo() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");

    git(temp.path(), &["init"]);
    git(temp.path(), &["config", "user.email", "test@example.com"]);
    git(temp.path(), &["config", "user.name", "Test User"]);

    temp
}

/// Git repository laid out as a notes root, with `data/notes/`.
#[allow(dead_code)]
pub fn create_notes_repo() -> TempDir {
    let temp = create_git_repo();
    fs::create_dir_all(temp.path().join("data/notes")).expect("failed to create notes dir");
    temp
}

/// Write `content` to `rel` under `root`, creating parent directories.
#[allow(dead_code)]
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// The notecrypt binary, isolated from the caller's environment.
#[allow(dead_code)]
pub fn notecrypt_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("notecrypt");
    cmd.env_remove("NOTECRYPT_DIR")
        .env_remove("NOTECRYPT_KEYS_DIR")
        .env_remove("NOTECRYPT_KEY_BITS")
        .env_remove("NOTECRYPT_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

/// The notecrypt binary pointed at `root` with `--root`.
#[allow(dead_code)]
pub fn notecrypt_in(root: &Path) -> Command {
    let mut cmd = notecrypt_cmd();
    cmd.arg("--root").arg(root).current_dir(root);
    cmd
}

/// Generate a test-sized key pair under `root`, optionally passphrase-protected.
#[allow(dead_code)]
pub fn generate_keys(root: &Path, passphrase: Option<&str>) {
    let mut cmd = notecrypt_in(root);
    cmd.args(["key", "generate", "--bits", TEST_BITS]);
    if let Some(passphrase) = passphrase {
        cmd.arg("--passphrase").env("NOTECRYPT_PASSPHRASE", passphrase);
    }
    cmd.assert().success();
}

/// Absolute path to the notecrypt test binary.
#[allow(dead_code)]
pub fn notecrypt_bin() -> &'static str {
    env!("CARGO_BIN_EXE_notecrypt")
}
