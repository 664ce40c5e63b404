use crate::error::Result;
use std::fs;
use std::path::Path;

const SECTION_HEADER: &str = "# Private encryption keys (never commit)";

/// Entries keeping private key material out of version control
pub const PRIVATE_KEY_ENTRIES: &[&str] = &[
    "keys/private_key.pem",
    "keys/*.key",
    "keys/*_private*",
    "*.pem.backup",
];

/// Append any missing private-key entries to `<root>/.gitignore`.
///
/// Returns whether the file changed.
pub fn ensure_keys_in_gitignore(root: &Path) -> Result<bool> {
    let path = root.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<&str> = PRIVATE_KEY_ENTRIES
        .iter()
        .copied()
        .filter(|entry| !present.contains(entry))
        .collect();

    if missing.is_empty() {
        return Ok(false);
    }

    let mut content = existing.clone();
    if !content.is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
    }
    if !present.contains(&SECTION_HEADER) {
        content.push_str(SECTION_HEADER);
        content.push('\n');
    }
    for entry in &missing {
        content.push_str(entry);
        content.push('\n');
    }

    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), added = missing.len(), "updated .gitignore");
    Ok(true)
}
