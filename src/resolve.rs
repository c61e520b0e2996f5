//! Operand resolution against a flat record.
//!
//! How a missing field is handled depends on the slot the operand sits in:
//!
//! - equality left-hand side: a single absent field resolves to the empty
//!   string (never errors);
//! - equality right-hand side and concatenation parts: an absent field
//!   resolves to its own token text (a bare token that names no field is
//!   compared as-is);
//! - registry condition values: an absent field is a hard error.
//!
//! Quoted literals resolve to their text unconditionally in every slot.

use crate::{EvalError, Operand, Record};

/// Lenient resolution: absent fields fall back to their own token text.
/// Used for equality right-hand sides and for every concatenation part.
pub(crate) fn resolve_lenient(operand: &Operand, record: &Record) -> String {
    match operand {
        Operand::Literal(text) => text.clone(),
        Operand::Field(name) => match record.get(name) {
            Some(value) => value.as_text(),
            None => name.clone(),
        },
        Operand::Concat(parts) => parts
            .iter()
            .map(|part| resolve_lenient(part, record))
            .collect(),
    }
}

/// Resolution for the equality left-hand side: a single absent field
/// resolves to the empty string. Concatenations resolve part-by-part with
/// the lenient fallback.
pub(crate) fn resolve_subject(operand: &Operand, record: &Record) -> String {
    match operand {
        Operand::Field(name) if !record.contains(name) => String::new(),
        other => resolve_lenient(other, record),
    }
}

/// Strict resolution for registry condition values: every referenced field
/// must be present.
pub(crate) fn resolve_required(operand: &Operand, record: &Record) -> Result<String, EvalError> {
    match operand {
        Operand::Literal(text) => Ok(text.clone()),
        Operand::Field(name) => match record.get(name) {
            Some(value) => Ok(value.as_text()),
            None => Err(EvalError::FieldNotFound { field: name.clone() }),
        },
        Operand::Concat(parts) => parts
            .iter()
            .map(|part| resolve_required(part, record))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    fn field(name: &str) -> Operand {
        Operand::Field(name.to_owned())
    }

    #[test]
    fn literal_resolves_to_text() {
        let record = Record::new();
        let literal = Operand::Literal("active".to_owned());
        assert_eq!(resolve_lenient(&literal, &record), "active");
        assert_eq!(resolve_subject(&literal, &record), "active");
        assert_eq!(resolve_required(&literal, &record).unwrap(), "active");
    }

    #[test]
    fn present_field_resolves_to_value_text() {
        let record = Record::new().set("age", 30_i64);
        assert_eq!(resolve_lenient(&field("age"), &record), "30");
        assert_eq!(resolve_subject(&field("age"), &record), "30");
        assert_eq!(resolve_required(&field("age"), &record).unwrap(), "30");
    }

    #[test]
    fn absent_field_lenient_falls_back_to_token() {
        let record = Record::new();
        assert_eq!(resolve_lenient(&field("nickname"), &record), "nickname");
    }

    #[test]
    fn absent_field_subject_is_empty() {
        let record = Record::new();
        assert_eq!(resolve_subject(&field("nickname"), &record), "");
    }

    #[test]
    fn absent_field_required_errors() {
        let record = Record::new();
        let err = resolve_required(&field("email"), &record).unwrap_err();
        assert_eq!(err.to_string(), "field not found: email");
    }

    #[test]
    fn concat_joins_in_order_without_separator() {
        let record = Record::new().set("first", "John").set("last", "Doe");
        let concat = Operand::Concat(vec![field("first"), field("last")]);
        assert_eq!(resolve_lenient(&concat, &record), "JohnDoe");
    }

    #[test]
    fn concat_parts_fall_back_to_token_text() {
        let record = Record::new().set("first", "John");
        let concat = Operand::Concat(vec![field("first"), field("last")]);
        assert_eq!(resolve_lenient(&concat, &record), "Johnlast");
        // The subject slot's empty-string default applies only to a single
        // bare field reference, not to concat parts.
        assert_eq!(resolve_subject(&concat, &record), "Johnlast");
    }

    #[test]
    fn concat_with_literal_separator() {
        let record = Record::new().set("region", "EU").set("serial", 42_i64);
        let concat = Operand::Concat(vec![
            field("region"),
            Operand::Literal("-".to_owned()),
            field("serial"),
        ]);
        assert_eq!(resolve_lenient(&concat, &record), "EU-42");
    }

    #[test]
    fn booleans_resolve_to_true_false() {
        let record = Record::new().set("active", true);
        assert_eq!(resolve_lenient(&field("active"), &record), "true");
    }
}
