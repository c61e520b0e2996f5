use crate::resolve::{resolve_lenient, resolve_required, resolve_subject};
use crate::{CompiledRule, Condition, EvalError, Expr, Lookup, Record, Violation};

/// Evaluate compiled rules in declared order, halting at the first rule
/// that fails or errors. A logical failure carries the rule's description;
/// a resolution error carries the error text.
pub(crate) fn run(
    rules: &[CompiledRule],
    record: &Record,
    lookup: &(impl Lookup + ?Sized),
) -> Result<(), Violation> {
    for rule in rules {
        match eval_expr(&rule.expr, record, lookup) {
            Ok(true) => tracing::debug!(rule = %rule.name, "rule passed"),
            Ok(false) => return Err(Violation::new(&rule.name, &rule.description)),
            Err(e) => {
                tracing::warn!(rule = %rule.name, error = %e, "rule evaluation error");
                return Err(Violation::new(&rule.name, e.to_string()));
            }
        }
    }
    Ok(())
}

pub(crate) fn eval_expr(
    expr: &Expr,
    record: &Record,
    lookup: &(impl Lookup + ?Sized),
) -> Result<bool, EvalError> {
    match expr {
        Expr::Equality { left, right } => {
            Ok(resolve_subject(left, record) == resolve_lenient(right, record))
        }
        Expr::RegistryExists {
            entity_type,
            conditions,
        } => {
            let resolved = resolve_conditions(conditions, record)?;
            // The single-condition form takes the field/value fast path;
            // both wrappers funnel into the same canonical query.
            Ok(match resolved.as_slice() {
                [(field, value)] => lookup.exists_field(entity_type, field, value),
                many => lookup.exists_where(entity_type, many),
            })
        }
        Expr::RegistryUnique {
            entity_type,
            conditions,
        } => {
            let resolved = resolve_conditions(conditions, record)?;
            Ok(lookup.is_unique(entity_type, &resolved))
        }
    }
}

fn resolve_conditions(
    conditions: &[Condition],
    record: &Record,
) -> Result<Vec<(String, String)>, EvalError> {
    conditions
        .iter()
        .map(|c| Ok((c.field.clone(), resolve_required(&c.value, record)?)))
        .collect()
}
