mod compile;
mod error;
mod evaluate;
mod lookup;
mod parse;
mod resolve;
mod schema;
#[cfg(feature = "binary-cache")]
mod serial;
mod types;

pub use error::XvalError;
pub use lookup::{EmptyRegistry, Filter, FilterOp, Lookup, SearchQuery};
pub use parse::{parse, ParseError};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    CompileError, CompiledRule, Condition, EvalError, Expr, Operand, Record, Rule, RuleBuilder,
    RuleSet, RuleSetBuilder, Value, Violation,
};
