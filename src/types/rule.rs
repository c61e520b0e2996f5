use super::expr::Expr;

/// A named rule as authored in a schema: an expression string plus an
/// optional human-readable description (used as the failure reason when
/// the rule evaluates to false).
///
/// Rules are created via [`RuleSetBuilder`](super::RuleSetBuilder) or
/// extracted from a schema document with
/// [`RuleSet::from_schema()`](super::RuleSet::from_schema).
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub expression: Option<String>,
    pub description: String,
}

/// A rule whose expression string has been parsed into an [`Expr`].
///
/// Produced by the compilation step and stored inside a
/// [`RuleSet`](super::RuleSet) in declaration order.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub expr: Expr,
    pub description: String,
}
