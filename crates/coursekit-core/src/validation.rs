//! Field-level validation results.
//!
//! A [`ValidationError`] never stops at the first problem: it lists every
//! violated constraint so the host can show them all at once.

use serde::Serialize;

/// What kind of constraint a field violated.
///
/// `key()` gives a stable translation key; the message is an English
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Text could not be parsed at all
    Parse,
    /// Field is missing or null
    Required,
    /// Field has the wrong JSON type
    InvalidType,
    /// Numeric field is above its bound
    TooBig,
    /// Text field is empty or whitespace
    Blank,
    /// Collection needs at least one entry
    Empty,
    /// Value repeats within its collection
    Duplicate,
}

impl IssueCode {
    /// Returns the translation key for this code.
    pub fn key(&self) -> &'static str {
        match self {
            IssueCode::Parse => "validation.parse",
            IssueCode::Required => "validation.required",
            IssueCode::InvalidType => "validation.invalid_type",
            IssueCode::TooBig => "validation.too_big",
            IssueCode::Blank => "validation.blank",
            IssueCode::Empty => "validation.empty",
            IssueCode::Duplicate => "validation.duplicate",
        }
    }
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path to the field (`correct`, `answers.1.value`, `$` for the root)
    pub path: String,
    pub code: IssueCode,
    pub message: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A non-empty list of field issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates an error with a single issue.
    pub fn single(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                path: path.into(),
                code,
                message: message.into(),
            }],
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns true if some issue is reported on exactly `path`.
    pub fn mentions(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }
}

/// Accumulates issues while a value is being checked.
#[derive(Debug, Default)]
pub struct Issues {
    issues: Vec<FieldIssue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, code: IssueCode, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            path: path.into(),
            code,
            message: message.into(),
        });
    }

    /// Records a `Blank` issue if `value` is empty after trimming.
    pub fn require_text(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(path, IssueCode::Blank, "must not be empty");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `Ok(())` if nothing was recorded.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
