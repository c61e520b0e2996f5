use std::fmt;

use super::error::CompileError;
use super::record::Record;
use super::rule::{CompiledRule, Rule};
use super::violation::Violation;
use crate::lookup::Lookup;

/// Builder for constructing a [`RuleSet`] in code.
///
/// Rules are defined via closures and compiled into an immutable,
/// thread-safe structure.
///
/// # Example
///
/// ```
/// use xval::{EmptyRegistry, Record, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .rule("passwordMatch", |r| {
///         r.expression("password==confirmPassword")
///             .description("Passwords must match")
///     })
///     .rule("nameMatch", |r| r.expression("fullName==firstName+lastName"))
///     .compile()
///     .unwrap();
///
/// let record = Record::new()
///     .set("password", "s3cret")
///     .set("confirmPassword", "s3cret")
///     .set("firstName", "John")
///     .set("lastName", "Doe")
///     .set("fullName", "JohnDoe");
/// assert!(ruleset.validate(&record, &EmptyRegistry).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug)]
pub struct RuleBuilder {
    expression: Option<String>,
    description: String,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a rule. The closure must call `.expression(..)` to set the
    /// rule expression; compilation fails with
    /// [`CompileError::MissingExpression`] otherwise.
    #[must_use]
    pub fn rule(mut self, name: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder {
            expression: None,
            description: String::new(),
        });
        self.rules.push(Rule {
            name: name.to_owned(),
            expression: builder.expression,
            description: builder.description,
        });
        self
    }

    /// Compile the rules into an immutable `RuleSet`.
    ///
    /// Expressions are parsed in declaration order; the first malformed
    /// rule aborts compilation.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on duplicate names, missing expressions,
    /// or syntax errors.
    pub fn compile(self) -> Result<RuleSet, CompileError> {
        crate::compile::compile(&self.rules)
    }
}

impl RuleBuilder {
    /// Set the rule expression string.
    #[must_use]
    pub fn expression(mut self, expression: &str) -> Self {
        self.expression = Some(expression.to_owned());
        self
    }

    /// Set the human-readable description used as the failure reason.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// A compiled, immutable rule set. Thread-safe and designed to live
/// behind `Arc`; one compile serves any number of concurrent
/// [`validate`](RuleSet::validate) calls.
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Check a record against every rule in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the [`Violation`] of the first rule that evaluates to
    /// false (reason: the rule's description) or fails to resolve
    /// (reason: the error text). Later rules are not evaluated.
    pub fn validate<L: Lookup + ?Sized>(
        &self,
        record: &Record,
        lookup: &L,
    ) -> Result<(), Violation> {
        crate::evaluate::run(&self.rules, record, lookup)
    }

    /// Extract and compile the rule block of a schema fragment.
    ///
    /// A schema without a rule block compiles to an empty rule set, which
    /// accepts every record.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a rule entry has no expression or an
    /// expression does not parse.
    pub fn from_schema(schema: &serde_json::Value) -> Result<Self, CompileError> {
        let rules = crate::schema::extract_rules(schema)?;
        let ruleset = crate::compile::compile(&rules)?;
        tracing::debug!(rules = ruleset.len(), "compiled schema rule block");
        Ok(ruleset)
    }

    /// Parse a schema document and compile its rule block.
    ///
    /// # Errors
    ///
    /// Returns [`XvalError`](crate::XvalError) on JSON or compile failure.
    pub fn from_schema_str(text: &str) -> Result<Self, crate::XvalError> {
        let schema: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_schema(&schema)?)
    }

    /// Read a schema file and compile its rule block.
    ///
    /// # Errors
    ///
    /// Returns [`XvalError`](crate::XvalError) on I/O, JSON, or compile
    /// failure.
    pub fn from_schema_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::XvalError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_schema_str(&text)
    }

    /// Rule names in evaluation (declaration) order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(feature = "binary-cache")]
impl RuleSet {
    /// Serialize this compiled rule set to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata. Callers can use this to detect when the original
    /// schema has changed and the cache should be rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a compiled rule set from a byte slice previously
    /// produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Serialize this compiled rule set and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the compiled rule set it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({} rules)", self.rules.len())
    }
}
