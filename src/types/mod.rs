mod error;
mod expr;
mod record;
mod rule;
mod ruleset;
mod value;
mod violation;

pub use error::{CompileError, EvalError};
pub use expr::{Condition, Expr, Operand};
pub use record::Record;
pub use rule::{CompiledRule, Rule};
pub use ruleset::{RuleBuilder, RuleSet, RuleSetBuilder};
pub use value::Value;
pub use violation::Violation;
