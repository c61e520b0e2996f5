use winnow::combinator::{alt, cut_err, delimited, preceded, repeat};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::{Condition, Expr, Operand};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Tokens -----------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited('\'', take_while(0.., |c: char| c != '\''), '\'').parse_next(input)
}

/// A quoted name that must be non-empty (entity types, condition fields).
fn quoted_name(input: &mut &str) -> ModalResult<String> {
    ws.parse_next(input)?;
    let name = quoted.parse_next(input)?;
    if name.is_empty() {
        return Err(ErrMode::from_input(input).cut());
    }
    Ok(name.to_owned())
}

/// A single term: a bare identifier (field reference) or a quoted literal.
fn term(input: &mut &str) -> ModalResult<Operand> {
    ws.parse_next(input)?;
    alt((
        quoted.map(|s: &str| Operand::Literal(s.to_owned())),
        ident.map(|s: &str| Operand::Field(s.to_owned())),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "field name or quoted literal",
    )))
    .parse_next(input)
}

/// One or more terms joined by `+`. A single term stays a plain operand;
/// two or more become a `Concat` in source order.
fn operand(input: &mut &str) -> ModalResult<Operand> {
    let first = term.parse_next(input)?;
    let rest: Vec<Operand> = repeat(0.., preceded((ws, '+'), cut_err(term))).parse_next(input)?;
    if rest.is_empty() {
        Ok(first)
    } else {
        let mut parts = Vec::with_capacity(rest.len() + 1);
        parts.push(first);
        parts.extend(rest);
        Ok(Operand::Concat(parts))
    }
}

// -- Equality ---------------------------------------------------------------

fn equality(input: &mut &str) -> ModalResult<Expr> {
    let left = operand.parse_next(input)?;
    ws.parse_next(input)?;
    "=="
        .context(StrContext::Expected(StrContextValue::Description("'=='")))
        .parse_next(input)?;
    let right = cut_err(operand).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(Expr::Equality { left, right })
}

// -- Registry calls ---------------------------------------------------------

/// `('EntityType',` -- the opening shared by both registry calls.
fn call_head(input: &mut &str) -> ModalResult<String> {
    (ws, cut_err('(')).parse_next(input)?;
    let entity_type = cut_err(quoted_name)
        .context(StrContext::Expected(StrContextValue::Description(
            "entity type",
        )))
        .parse_next(input)?;
    (ws, cut_err(',')).parse_next(input)?;
    Ok(entity_type)
}

/// `'field': value` inside a condition map.
fn map_pair(input: &mut &str) -> ModalResult<Condition> {
    let field = quoted_name
        .context(StrContext::Expected(StrContextValue::Description(
            "condition field",
        )))
        .parse_next(input)?;
    (ws, cut_err(':')).parse_next(input)?;
    let value = cut_err(term).parse_next(input)?;
    Ok(Condition { field, value })
}

fn map_args(input: &mut &str) -> ModalResult<Vec<Condition>> {
    ws.parse_next(input)?;
    '{'.parse_next(input)?;
    let first = cut_err(map_pair).parse_next(input)?;
    let rest: Vec<Condition> =
        repeat(0.., preceded((ws, ','), cut_err(map_pair))).parse_next(input)?;
    (ws, cut_err('}')).parse_next(input)?;
    let mut conditions = Vec::with_capacity(rest.len() + 1);
    conditions.push(first);
    conditions.extend(rest);
    Ok(conditions)
}

/// `'field', value` -- the single-condition existence form.
fn single_condition(input: &mut &str) -> ModalResult<Vec<Condition>> {
    let field = cut_err(quoted_name)
        .context(StrContext::Expected(StrContextValue::Description(
            "condition field",
        )))
        .parse_next(input)?;
    (ws, cut_err(',')).parse_next(input)?;
    let value = cut_err(term).parse_next(input)?;
    Ok(vec![Condition { field, value }])
}

fn exists_call(input: &mut &str) -> ModalResult<Expr> {
    let entity_type = call_head.parse_next(input)?;
    ws.parse_next(input)?;
    let conditions = if input.starts_with('{') {
        map_args.parse_next(input)?
    } else {
        single_condition.parse_next(input)?
    };
    (ws, cut_err(')'), ws).parse_next(input)?;
    Ok(Expr::RegistryExists {
        entity_type,
        conditions,
    })
}

fn unique_call(input: &mut &str) -> ModalResult<Expr> {
    let entity_type = call_head.parse_next(input)?;
    let conditions = cut_err(map_args)
        .context(StrContext::Expected(StrContextValue::Description(
            "condition map",
        )))
        .parse_next(input)?;
    (ws, cut_err(')'), ws).parse_next(input)?;
    Ok(Expr::RegistryUnique {
        entity_type,
        conditions,
    })
}

// -- Top-level parser -------------------------------------------------------

/// Classify on the leading token: a registry call keyword dispatches to the
/// matching call grammar, anything else is an equality. Quoted literals
/// that merely contain a call name never reach the call grammars.
pub fn rule_expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let checkpoint = input.checkpoint();
    if let Ok(name) = ident.parse_next(input) {
        match name {
            "existsInRegistry" => return exists_call(input),
            "isUniqueInRegistry" => return unique_call(input),
            _ => {}
        }
    }
    input.reset(&checkpoint);
    equality(input)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;

    use super::*;

    fn field(name: &str) -> Operand {
        Operand::Field(name.to_owned())
    }

    #[test]
    fn parse_simple_equality() {
        let expr = parse("password==confirmPassword").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("password"),
                right: field("confirmPassword"),
            }
        );
    }

    #[test]
    fn parse_equality_with_spaces() {
        let expr = parse("  password ==  confirmPassword ").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("password"),
                right: field("confirmPassword"),
            }
        );
    }

    #[test]
    fn parse_concatenation() {
        let expr = parse("fullName==firstName+lastName").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("fullName"),
                right: Operand::Concat(vec![field("firstName"), field("lastName")]),
            }
        );
    }

    #[test]
    fn parse_concatenation_three_parts() {
        let expr = parse("code==region + '-' + serial").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("code"),
                right: Operand::Concat(vec![
                    field("region"),
                    Operand::Literal("-".to_owned()),
                    field("serial"),
                ]),
            }
        );
    }

    #[test]
    fn parse_concatenation_on_left() {
        let expr = parse("a+b==c").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: Operand::Concat(vec![field("a"), field("b")]),
                right: field("c"),
            }
        );
    }

    #[test]
    fn parse_quoted_literal_operand() {
        let expr = parse("status=='active'").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("status"),
                right: Operand::Literal("active".to_owned()),
            }
        );
    }

    #[test]
    fn parse_exists_single_field() {
        let expr = parse("existsInRegistry('User', 'email', email)").unwrap();
        assert_eq!(
            expr,
            Expr::RegistryExists {
                entity_type: "User".to_owned(),
                conditions: vec![Condition {
                    field: "email".to_owned(),
                    value: field("email"),
                }],
            }
        );
    }

    #[test]
    fn parse_exists_map_form() {
        let expr = parse("existsInRegistry('User', {'email': email, 'phone': phone})").unwrap();
        assert_eq!(
            expr,
            Expr::RegistryExists {
                entity_type: "User".to_owned(),
                conditions: vec![
                    Condition {
                        field: "email".to_owned(),
                        value: field("email"),
                    },
                    Condition {
                        field: "phone".to_owned(),
                        value: field("phone"),
                    },
                ],
            }
        );
    }

    #[test]
    fn parse_unique_map_form() {
        let expr = parse("isUniqueInRegistry('User', {'email': email})").unwrap();
        assert_eq!(
            expr,
            Expr::RegistryUnique {
                entity_type: "User".to_owned(),
                conditions: vec![Condition {
                    field: "email".to_owned(),
                    value: field("email"),
                }],
            }
        );
    }

    #[test]
    fn parse_unique_requires_map() {
        assert!(parse("isUniqueInRegistry('User', 'email', email)").is_err());
    }

    #[test]
    fn parse_registry_value_can_be_literal() {
        let expr = parse("existsInRegistry('Org', 'status', 'active')").unwrap();
        assert_eq!(
            expr,
            Expr::RegistryExists {
                entity_type: "Org".to_owned(),
                conditions: vec![Condition {
                    field: "status".to_owned(),
                    value: Operand::Literal("active".to_owned()),
                }],
            }
        );
    }

    #[test]
    fn parse_double_equality_rejected() {
        assert!(parse("a==b==c").is_err());
    }

    #[test]
    fn parse_missing_equality_rejected() {
        assert!(parse("justAField").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn parse_empty_entity_type_rejected() {
        assert!(parse("existsInRegistry('', 'email', email)").is_err());
    }

    #[test]
    fn parse_empty_condition_field_rejected() {
        assert!(parse("existsInRegistry('User', '', email)").is_err());
    }

    #[test]
    fn parse_missing_closing_brace_rejected() {
        assert!(parse("isUniqueInRegistry('User', {'email': email)").is_err());
    }

    #[test]
    fn parse_missing_closing_paren_rejected() {
        assert!(parse("existsInRegistry('User', 'email', email").is_err());
    }

    #[test]
    fn parse_empty_condition_map_rejected() {
        assert!(parse("isUniqueInRegistry('User', {})").is_err());
    }

    #[test]
    fn parse_trailing_garbage_rejected() {
        assert!(parse("existsInRegistry('User', 'email', email) extra").is_err());
    }

    #[test]
    fn literal_containing_call_name_is_equality() {
        // First-token classification: the keyword inside a quoted literal
        // does not turn this into a registry call.
        let expr = parse("note=='existsInRegistry'").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("note"),
                right: Operand::Literal("existsInRegistry".to_owned()),
            }
        );
    }

    #[test]
    fn keyword_prefixed_identifier_is_equality() {
        let expr = parse("existsInRegistryFlag==other").unwrap();
        assert_eq!(
            expr,
            Expr::Equality {
                left: field("existsInRegistryFlag"),
                right: field("other"),
            }
        );
    }

    #[test]
    fn parse_map_with_whitespace() {
        let expr = parse("isUniqueInRegistry( 'User' , { 'email' : email , 'phone' : phone } )")
            .unwrap();
        match expr {
            Expr::RegistryUnique { conditions, .. } => assert_eq!(conditions.len(), 2),
            other => panic!("expected RegistryUnique, got {other:?}"),
        }
    }

    #[test]
    fn display_round_trips_through_parser() {
        let inputs = [
            "password==confirmPassword",
            "fullName==firstName+lastName",
            "existsInRegistry('User', 'email', email)",
            "existsInRegistry('User', {'email': email, 'phone': phone})",
            "isUniqueInRegistry('User', {'email': email})",
        ];
        for input in inputs {
            let expr = parse(input).unwrap();
            let reparsed = parse(&expr.to_string()).unwrap();
            assert_eq!(expr, reparsed, "failed for {input}");
        }
    }
}
