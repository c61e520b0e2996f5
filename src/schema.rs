use crate::{CompileError, Rule};

/// Key of the rule block inside a schema document.
pub(crate) const RULE_BLOCK_KEY: &str = "x-validation";

/// Extract the ordered rule set from a schema fragment.
///
/// The rule block is an object keyed by rule name, each entry holding a
/// `rule` expression string and an optional `description`. Declaration
/// order in the document is preserved. A schema without a rule block (or
/// with a non-object one) yields no rules.
pub(crate) fn extract_rules(schema: &serde_json::Value) -> Result<Vec<Rule>, CompileError> {
    let Some(block) = schema.get(RULE_BLOCK_KEY).and_then(|b| b.as_object()) else {
        return Ok(Vec::new());
    };

    block
        .iter()
        .map(|(name, entry)| {
            let expression = entry
                .get("rule")
                .and_then(|r| r.as_str())
                .map(str::to_owned);
            if expression.is_none() {
                return Err(CompileError::MissingExpression { rule: name.clone() });
            }
            let description = entry
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or_default()
                .to_owned();
            Ok(Rule {
                name: name.clone(),
                expression,
                description,
            })
        })
        .collect()
}
