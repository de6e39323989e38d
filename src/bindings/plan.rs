use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bindings::action::ActionIdentifier;
use crate::bindings::binding::{Binding, InputSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueLevel::Info => "info",
            IssueLevel::Warning => "warning",
            IssueLevel::Error => "error",
        })
    }
}

/// A discrepancy encountered during planning or export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<InputSlot>,
}

impl ValidationIssue {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(IssueLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(IssueLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(IssueLevel::Error, message)
    }

    fn with_level(level: IssueLevel, message: impl Into<String>) -> Self {
        ValidationIssue {
            level,
            message: message.into(),
            action: None,
            slot: None,
        }
    }

    pub fn with_action(mut self, action: ActionIdentifier) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_slot(mut self, slot: InputSlot) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// Ordered list of issues discovered while planning bindings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.level == IssueLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A staged, not-yet-applied set of binding mutations. An "update" is modeled
/// as remove + add; bindings themselves are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingPlan {
    pub to_add: Vec<Binding>,
    pub to_remove: Vec<Binding>,
    pub validation: ValidationReport,
}

impl BindingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_add(&mut self, binding: Binding) {
        self.to_add.push(binding);
    }

    pub fn record_remove(&mut self, binding: Binding) {
        self.to_remove.push(binding);
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Concatenate another plan's entries and issues; used when combining
    /// per-side plans into one.
    pub fn merge(&mut self, other: BindingPlan) {
        self.to_add.extend(other.to_add);
        self.to_remove.extend(other.to_remove);
        self.validation.extend(other.validation.issues);
    }
}
