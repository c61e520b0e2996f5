mod error;
mod grammar;

pub use error::ParseError;

/// Parse a rule expression string into an [`Expr`](crate::Expr).
///
/// # Errors
///
/// Returns [`ParseError`] (carrying the offending expression text) if the
/// input does not match the rule grammar.
pub fn parse(expression: &str) -> Result<crate::Expr, ParseError> {
    use winnow::Parser;
    grammar::rule_expr
        .parse(expression)
        .map_err(|e| ParseError::new(expression, e.to_string()))
}
