use thiserror::Error;

use crate::parse::ParseError;

/// Errors raised while compiling authored rules into a
/// [`RuleSet`](super::RuleSet).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("duplicate rule name '{name}'")]
    DuplicateRule { name: String },

    #[error("rule '{rule}' has no expression")]
    MissingExpression { rule: String },

    #[error("rule '{rule}': {source}")]
    Syntax {
        rule: String,
        #[source]
        source: ParseError,
    },
}

/// Errors raised while resolving an expression against a record.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A registry predicate referenced a record field that does not exist.
    #[error("field not found: {field}")]
    FieldNotFound { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rule_message() {
        let err = CompileError::DuplicateRule {
            name: "passwordMatch".into(),
        };
        assert_eq!(err.to_string(), "duplicate rule name 'passwordMatch'");
    }

    #[test]
    fn missing_expression_message() {
        let err = CompileError::MissingExpression {
            rule: "nameMatch".into(),
        };
        assert_eq!(err.to_string(), "rule 'nameMatch' has no expression");
    }

    #[test]
    fn syntax_message_names_rule() {
        let source = crate::parse::parse("a==b==c").unwrap_err();
        let err = CompileError::Syntax {
            rule: "broken".into(),
            source,
        };
        assert!(err.to_string().starts_with("rule 'broken': "));
    }

    #[test]
    fn field_not_found_message() {
        let err = EvalError::FieldNotFound {
            field: "email".into(),
        };
        assert_eq!(err.to_string(), "field not found: email");
    }
}
