use std::fmt;

/// The single structured failure a validation call halts with: the name of
/// the first rule that failed and the reason (the rule's description for a
/// logical failure, the underlying error text otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Violation {
    rule: String,
    reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for rule '{}': {}", self.rule, self.reason)
    }
}

impl std::error::Error for Violation {}

impl Violation {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Name of the rule that halted validation.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Why the rule failed.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
