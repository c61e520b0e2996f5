use std::collections::HashSet;

use crate::{CompileError, CompiledRule, Rule, RuleSet};

/// Compile authored rules into an immutable [`RuleSet`], preserving
/// declaration order. Rules are parsed in that order and the first syntax
/// error wins, matching the fail-fast contract of validation itself.
pub(crate) fn compile(rules: &[Rule]) -> Result<RuleSet, CompileError> {
    check_duplicates(rules)?;

    let compiled: Vec<CompiledRule> = rules
        .iter()
        .map(|rule| {
            let expression =
                rule.expression
                    .as_deref()
                    .ok_or_else(|| CompileError::MissingExpression {
                        rule: rule.name.clone(),
                    })?;
            let expr = crate::parse::parse(expression).map_err(|source| CompileError::Syntax {
                rule: rule.name.clone(),
                source,
            })?;
            Ok(CompiledRule {
                name: rule.name.clone(),
                expr,
                description: rule.description.clone(),
            })
        })
        .collect::<Result<_, CompileError>>()?;

    Ok(RuleSet { rules: compiled })
}

fn check_duplicates(rules: &[Rule]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(&rule.name) {
            return Err(CompileError::DuplicateRule {
                name: rule.name.clone(),
            });
        }
    }
    Ok(())
}
