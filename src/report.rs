//! Validation findings and their rendering.

use serde::Serialize;
use std::fmt;

/// Matched text longer than this is cut off in messages
pub const MAX_MATCH_DISPLAY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    pub remedy: String,
    /// Description of the rule that matched, for pattern findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl ValidationIssue {
    pub fn error(file: impl Into<String>, message: impl Into<String>, remedy: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: file.into(),
            line: None,
            message: message.into(),
            remedy: remedy.into(),
            rule: None,
        }
    }

    pub fn warning(file: impl Into<String>, message: impl Into<String>, remedy: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, message, remedy)
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// `file:line`, or just `file` when the issue has no line
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.file),
            None => self.file.clone(),
        }
    }

    fn render(&self, marker: &str, out: &mut String) {
        out.push_str(&format!("  {marker} {}\n", self.location()));
        out.push_str(&format!("     {}\n", self.message));
        if !self.remedy.is_empty() {
            out.push_str(&format!("     Fix: {}\n", self.remedy));
        }
        out.push('\n');
    }
}

/// Shorten matched text for display, on a char boundary
pub fn truncate_match(text: &str) -> String {
    match text.char_indices().nth(MAX_MATCH_DISPLAY) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// All findings from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Order by file, then line, with file-level issues first
    pub fn sort(&mut self) {
        self.issues.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.severity.cmp(&b.severity))
        });
    }

    pub fn render_errors(&self) -> String {
        let mut out = String::new();
        for issue in self.errors() {
            issue.render("[x]", &mut out);
        }
        out
    }

    pub fn render_warnings(&self) -> String {
        let mut out = String::new();
        for issue in self.warnings() {
            issue.render("[!]", &mut out);
        }
        out
    }
}
