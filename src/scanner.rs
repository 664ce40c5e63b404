//! # Leak Scanner
//!
//! Decides whether a set of files (normally the files staged for a commit)
//! contains unencrypted secret-shaped text.
//!
//! Per file:
//!
//! ```text
//! dangerous name ─────────────────────────────► error (always)
//! not a candidate ────────────────────────────► skip, never opened
//! candidate ─► read ─► binary / missing ──────► skip
//!                   └► text ─► header check ──► error if sensitive without a block
//!                            ├► marker check ─► error per malformed block
//!                            └► strip blocks ─► line-by-line rules
//! ```
//!
//! Candidates live under a configured content area (or are a top-level
//! configuration file) and carry an allow-listed text extension. Content comes
//! from the working tree ([`LeakScanner::validate`]) or from the index
//! ([`LeakScanner::validate_staged`]), which is what a commit records.
//!
//! Rules run one line at a time so every finding has a line number. Blocks
//! whose payload parses are blanked out first, keeping the remaining line
//! numbers intact. Markers around anything else are not trusted: the text
//! between them is scanned like any other line.
//! High-confidence rules produce errors; medium-confidence rules produce
//! warnings. A line containing a placeholder marker is never flagged.

use crate::block;
use crate::config::Config;
use crate::error::{NoteCryptError, Result};
use crate::frontmatter::Frontmatter;
use crate::git::StagedFiles;
use crate::report::{truncate_match, Severity, ValidationIssue, ValidationResult};
use crate::rules::RuleSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DANGEROUS_FILE_MESSAGE: &str = "Private key or credential file must never be committed";
const DANGEROUS_FILE_REMEDY: &str = "Add it to .gitignore and unstage it: git rm --cached <file>";
const UNMARKED_SENSITIVE_MESSAGE: &str = "File marked as sensitive but contains no encrypted blocks";
const MALFORMED_BLOCK_MESSAGE: &str = "Encrypted block markers around content that is not an encrypted payload";
const MALFORMED_BLOCK_REMEDY: &str = "Replace the block with the output of `notecrypt encrypt`";
const HIGH_REMEDY: &str = "Encrypt this content with `notecrypt encrypt` or remove it";
const MEDIUM_REMEDY: &str = "Review and encrypt if needed";

pub struct LeakScanner {
    root: PathBuf,
    content_areas: Vec<String>,
    config_files: Vec<String>,
    scan_extensions: Vec<String>,
    rules: RuleSet,
}

impl LeakScanner {
    /// Scanner with the built-in rule tables
    pub fn new(config: &Config) -> Result<Self> {
        let rules = RuleSet::builtin(&config.placeholder_markers)?;
        Ok(Self::with_rules(config, rules))
    }

    pub fn with_rules(config: &Config, rules: RuleSet) -> Self {
        Self {
            root: config.root.clone(),
            content_areas: config.content_areas.clone(),
            config_files: config.config_files.clone(),
            scan_extensions: config.scan_extensions.iter().map(|e| e.to_lowercase()).collect(),
            rules,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether `path` (relative to the root) is opened at all
    pub fn is_candidate(&self, path: &str) -> bool {
        let in_area = self.content_areas.iter().any(|area| path.starts_with(area.as_str()))
            || self.config_files.iter().any(|file| path == file);
        if !in_area {
            return false;
        }

        let lower = path.to_lowercase();
        self.scan_extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Validate root-relative `files` as they are on disk.
    ///
    /// Missing and binary files are skipped. Any other read failure is a
    /// [`NoteCryptError::ScanInternalError`]: the pass could not finish.
    pub fn validate(&self, files: &[String]) -> Result<ValidationResult> {
        self.validate_with(files, |file| self.read_working_tree(file))
    }

    /// Validate `files` as they are staged in `vcs`'s index.
    ///
    /// Paths without an index entry are skipped like missing files.
    pub fn validate_staged(&self, files: &[String], vcs: &impl StagedFiles) -> Result<ValidationResult> {
        self.validate_with(files, |file| {
            vcs.staged_content(file).map_err(|e| match e {
                NoteCryptError::ScanInternalError(_) => e,
                other => NoteCryptError::ScanInternalError(format!("could not read staged {file}: {other}")),
            })
        })
    }

    fn validate_with<F>(&self, files: &[String], mut load: F) -> Result<ValidationResult>
    where
        F: FnMut(&str) -> Result<Option<Vec<u8>>>,
    {
        let mut files: Vec<&str> = files.iter().map(String::as_str).collect();
        files.sort_unstable();
        files.dedup();

        let mut result = ValidationResult::new();

        for &file in &files {
            if self.rules.is_dangerous_file(file) {
                tracing::debug!(file, "dangerous file staged");
                result.push(ValidationIssue::error(file, DANGEROUS_FILE_MESSAGE, DANGEROUS_FILE_REMEDY));
            }
        }

        for &file in &files {
            if !self.is_candidate(file) {
                tracing::debug!(file, "not a scan candidate");
                continue;
            }
            let Some(bytes) = load(file)? else {
                tracing::debug!(file, "no content to scan, skipping");
                continue;
            };
            if let Some(content) = decode_text(file, bytes) {
                self.scan_content(file, &content, &mut result);
            }
        }

        result.sort();
        tracing::info!(
            files = files.len(),
            errors = result.errors().count(),
            warnings = result.warnings().count(),
            "scan complete"
        );
        Ok(result)
    }

    /// Scan one document's text, appending findings to `result`
    pub fn scan_content(&self, file: &str, content: &str, result: &mut ValidationResult) {
        if file.to_lowercase().ends_with(".md") {
            self.check_header(file, content, result);
        }

        for block in block::malformed_blocks(content) {
            tracing::debug!(file, offset = block.range.start, "malformed encrypted block");
            result.push(
                ValidationIssue::error(file, MALFORMED_BLOCK_MESSAGE, MALFORMED_BLOCK_REMEDY)
                    .at_line(block.line_in(content)),
            );
        }

        let stripped = block::strip_all(content);
        for (idx, line) in stripped.lines().enumerate() {
            self.scan_line(file, idx + 1, line, result);
        }
    }

    fn check_header(&self, file: &str, content: &str, result: &mut ValidationResult) {
        let header = Frontmatter::parse(content);
        if !header.declares_sensitive() || block::contains_block(header.body()) {
            return;
        }

        let remedy = match header.id() {
            Some(id) => format!("Encrypt the sensitive passages of note {id}, e.g. `notecrypt encrypt` and paste the block into the note"),
            None => "Encrypt the sensitive content or remove the sensitive flag".to_string(),
        };
        result.push(ValidationIssue::error(file, UNMARKED_SENSITIVE_MESSAGE, remedy));
    }

    fn scan_line(&self, file: &str, line_no: usize, line: &str, result: &mut ValidationResult) {
        if line.trim().is_empty() || self.rules.is_placeholder_line(line) {
            return;
        }

        for rule in self.rules.rules() {
            let Some(found) = rule.regex.find(line) else {
                continue;
            };
            let shown = truncate_match(found.as_str());
            let issue = match rule.confidence.severity() {
                Severity::Error => ValidationIssue::error(
                    file,
                    format!("Unencrypted sensitive data detected ({}): {shown}", rule.description),
                    HIGH_REMEDY,
                ),
                Severity::Warning => ValidationIssue::warning(
                    file,
                    format!("Possible sensitive content marker: {shown}"),
                    MEDIUM_REMEDY,
                ),
            };
            result.push(issue.at_line(line_no).with_rule(rule.description.clone()));
        }
    }

    fn read_working_tree(&self, file: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(file)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(file, "file missing on disk");
                Ok(None)
            }
            Err(e) => Err(NoteCryptError::ScanInternalError(format!(
                "could not read {file}: {e}"
            ))),
        }
    }
}

/// Text content, or `None` for binary data
fn decode_text(file: &str, bytes: Vec<u8>) -> Option<String> {
    if bytes.contains(&0) {
        tracing::debug!(file, "binary content, skipping");
        return None;
    }
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::debug!(file, "not valid UTF-8, skipping");
            None
        }
    }
}
