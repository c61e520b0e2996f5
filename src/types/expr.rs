use std::fmt;

/// A resolvable unit inside a rule expression.
///
/// A bare token parses to [`Operand::Field`]; whether the record actually
/// has that key is decided at evaluation time (see the resolver's
/// per-slot leniency rules). `Concat` joins its parts with no separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A reference to a record field by name.
    Field(String),
    /// A quoted literal, resolved to its text unconditionally.
    Literal(String),
    /// An ordered concatenation of operands. Never nested.
    Concat(Vec<Operand>),
}

/// One `field: value` entry of a registry predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub value: Operand,
}

/// Parsed rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `left == right`, exact string equality after resolution.
    Equality { left: Operand, right: Operand },
    /// `existsInRegistry('EntityType', ...)` -- at least one condition.
    RegistryExists {
        entity_type: String,
        conditions: Vec<Condition>,
    },
    /// `isUniqueInRegistry('EntityType', {...})` -- at least one condition.
    RegistryUnique {
        entity_type: String,
        conditions: Vec<Condition>,
    },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(name) => write!(f, "{name}"),
            Operand::Literal(text) => write!(f, "'{text}'"),
            Operand::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "+")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

fn fmt_conditions(f: &mut fmt::Formatter<'_>, conditions: &[Condition]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, c) in conditions.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "'{}': {}", c.field, c.value)?;
    }
    write!(f, "}}")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Equality { left, right } => write!(f, "{left}=={right}"),
            Expr::RegistryExists {
                entity_type,
                conditions,
            } => {
                // Single-condition form renders as the three-argument call
                if let [only] = conditions.as_slice() {
                    write!(
                        f,
                        "existsInRegistry('{entity_type}', '{}', {})",
                        only.field, only.value
                    )
                } else {
                    write!(f, "existsInRegistry('{entity_type}', ")?;
                    fmt_conditions(f, conditions)?;
                    write!(f, ")")
                }
            }
            Expr::RegistryUnique {
                entity_type,
                conditions,
            } => {
                write!(f, "isUniqueInRegistry('{entity_type}', ")?;
                fmt_conditions(f, conditions)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Operand {
        Operand::Field(name.to_owned())
    }

    #[test]
    fn display_equality() {
        let expr = Expr::Equality {
            left: field("password"),
            right: field("confirmPassword"),
        };
        assert_eq!(expr.to_string(), "password==confirmPassword");
    }

    #[test]
    fn display_concat_right() {
        let expr = Expr::Equality {
            left: field("fullName"),
            right: Operand::Concat(vec![field("firstName"), field("lastName")]),
        };
        assert_eq!(expr.to_string(), "fullName==firstName+lastName");
    }

    #[test]
    fn display_literal_quoted() {
        assert_eq!(Operand::Literal("a b".into()).to_string(), "'a b'");
    }

    #[test]
    fn display_single_condition_exists() {
        let expr = Expr::RegistryExists {
            entity_type: "User".into(),
            conditions: vec![Condition {
                field: "email".into(),
                value: field("email"),
            }],
        };
        assert_eq!(expr.to_string(), "existsInRegistry('User', 'email', email)");
    }

    #[test]
    fn display_map_condition_unique() {
        let expr = Expr::RegistryUnique {
            entity_type: "User".into(),
            conditions: vec![
                Condition {
                    field: "email".into(),
                    value: field("email"),
                },
                Condition {
                    field: "phone".into(),
                    value: field("phone"),
                },
            ],
        };
        assert_eq!(
            expr.to_string(),
            "isUniqueInRegistry('User', {'email': email, 'phone': phone})"
        );
    }
}
