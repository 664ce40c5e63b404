//! # Commit Gate
//!
//! One validation pass per commit attempt. The gate fails closed on findings
//! and open on its own failures:
//!
//! | Situation | Verdict |
//! |---|---|
//! | root is not a managed notes repository | allow |
//! | nothing staged | allow |
//! | any error-severity finding | block |
//! | warnings only | allow, warnings printed |
//! | I/O failure, scanner error, panic | allow, caution printed |
//!
//! Files are scanned as staged in the index, which is what the commit records,
//! not as they happen to be in the working tree.
//!
//! The report text is returned rather than printed so the caller decides
//! where it goes; the `hook check` command writes it to stdout.

use crate::config::Config;
use crate::error::Result;
use crate::git::StagedFiles;
use crate::scanner::LeakScanner;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

const RULE: &str = "============================================================";
pub const BYPASS_HINT: &str = "To bypass this check (NOT recommended):\n   git commit --no-verify\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block,
}

impl Verdict {
    /// Process exit code for a git hook
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Allow => 0,
            Verdict::Block => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub verdict: Verdict,
    /// User-facing report
    pub output: String,
}

pub struct CommitGate<V: StagedFiles> {
    config: Config,
    vcs: V,
}

impl<V: StagedFiles> CommitGate<V> {
    pub fn new(config: Config, vcs: V) -> Self {
        Self { config, vcs }
    }

    pub fn evaluate(&self) -> GateReport {
        let mut output = format!("\n{RULE}\nnotecrypt - Sensitive Data Validation\n{RULE}\n\n");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.check(&mut output)));
        let verdict = match outcome {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "validation failed internally, allowing commit");
                output.push_str(&format!("Warning: error during validation: {e}\n"));
                output.push_str("   Allowing commit to proceed\n");
                Verdict::Allow
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(reason = %reason, "validation panicked, allowing commit");
                output.push_str(&format!("Warning: internal error during validation: {reason}\n"));
                output.push_str("   Allowing commit to proceed\n");
                Verdict::Allow
            }
        };

        GateReport { verdict, output }
    }

    fn check(&self, out: &mut String) -> Result<Verdict> {
        if !self.config.is_managed_root() {
            out.push_str("Not a managed notes repository, skipping validation\n");
            return Ok(Verdict::Allow);
        }

        let staged = self.vcs.staged_files()?;
        if staged.is_empty() {
            out.push_str("No files staged for commit\n");
            return Ok(Verdict::Allow);
        }

        out.push_str(&format!("Scanning {} staged file(s)...\n\n", staged.len()));

        let scanner = LeakScanner::new(&self.config)?;
        let result = scanner.validate_staged(&staged, &self.vcs)?;

        if result.has_errors() {
            out.push_str("Commit blocked: sensitive data validation failed\n\n");
            out.push_str(&result.render_errors());
            out.push('\n');
            out.push_str(BYPASS_HINT);
            return Ok(Verdict::Block);
        }

        if result.has_warnings() {
            out.push_str("Warnings detected:\n\n");
            out.push_str(&result.render_warnings());
            out.push_str("Review these warnings before committing\n\n");
        }

        out.push_str("Validation passed - no sensitive data issues detected\n");
        Ok(Verdict::Allow)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
