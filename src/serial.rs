//! Binary serialization and deserialization of compiled rule sets.
//!
//! This module provides a stable binary format for persisting compiled
//! [`RuleSet`](crate::RuleSet) values. The format consists of a 32-byte fixed
//! header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"XVAL"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CompiledRule, Condition, Expr, Operand, RuleSet};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"XVAL";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`RuleSet`](crate::RuleSet) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode ruleset: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`RuleSet`](crate::RuleSet) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not an xval binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleSet {
    metadata: RuleSetMetadata,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleSetMetadata {
    rule_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    name: String,
    description: String,
    expr: SerializedExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedExpr {
    Equality {
        left: SerializedOperand,
        right: SerializedOperand,
    },
    Exists {
        entity_type: String,
        conditions: Vec<SerializedCondition>,
    },
    Unique {
        entity_type: String,
        conditions: Vec<SerializedCondition>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedOperand {
    Field(String),
    Literal(String),
    Concat(Vec<SerializedOperand>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedCondition {
    field: String,
    value: SerializedOperand,
}

// ---------------------------------------------------------------------------
// Operand conversion
// ---------------------------------------------------------------------------

fn serialize_operand(operand: &Operand) -> SerializedOperand {
    match operand {
        Operand::Field(name) => SerializedOperand::Field(name.clone()),
        Operand::Literal(text) => SerializedOperand::Literal(text.clone()),
        Operand::Concat(parts) => {
            SerializedOperand::Concat(parts.iter().map(serialize_operand).collect())
        }
    }
}

fn deserialize_operand(operand: SerializedOperand) -> Operand {
    match operand {
        SerializedOperand::Field(name) => Operand::Field(name),
        SerializedOperand::Literal(text) => Operand::Literal(text),
        SerializedOperand::Concat(parts) => {
            Operand::Concat(parts.into_iter().map(deserialize_operand).collect())
        }
    }
}

// ---------------------------------------------------------------------------
// Expression conversion
// ---------------------------------------------------------------------------

fn serialize_conditions(conditions: &[Condition]) -> Vec<SerializedCondition> {
    conditions
        .iter()
        .map(|c| SerializedCondition {
            field: c.field.clone(),
            value: serialize_operand(&c.value),
        })
        .collect()
}

fn deserialize_conditions(conditions: Vec<SerializedCondition>) -> Vec<Condition> {
    conditions
        .into_iter()
        .map(|c| Condition {
            field: c.field,
            value: deserialize_operand(c.value),
        })
        .collect()
}

fn serialize_expr(expr: &Expr) -> SerializedExpr {
    match expr {
        Expr::Equality { left, right } => SerializedExpr::Equality {
            left: serialize_operand(left),
            right: serialize_operand(right),
        },
        Expr::RegistryExists {
            entity_type,
            conditions,
        } => SerializedExpr::Exists {
            entity_type: entity_type.clone(),
            conditions: serialize_conditions(conditions),
        },
        Expr::RegistryUnique {
            entity_type,
            conditions,
        } => SerializedExpr::Unique {
            entity_type: entity_type.clone(),
            conditions: serialize_conditions(conditions),
        },
    }
}

fn deserialize_expr(expr: SerializedExpr) -> Expr {
    match expr {
        SerializedExpr::Equality { left, right } => Expr::Equality {
            left: deserialize_operand(left),
            right: deserialize_operand(right),
        },
        SerializedExpr::Exists {
            entity_type,
            conditions,
        } => Expr::RegistryExists {
            entity_type,
            conditions: deserialize_conditions(conditions),
        },
        SerializedExpr::Unique {
            entity_type,
            conditions,
        } => Expr::RegistryUnique {
            entity_type,
            conditions: deserialize_conditions(conditions),
        },
    }
}

// ---------------------------------------------------------------------------
// RuleSet <-> SerializedRuleSet
// ---------------------------------------------------------------------------

fn ruleset_to_serialized(ruleset: &RuleSet, source_text: Option<&str>) -> SerializedRuleSet {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let rules: Vec<SerializedRule> = ruleset
        .rules
        .iter()
        .map(|r| SerializedRule {
            name: r.name.clone(),
            description: r.description.clone(),
            expr: serialize_expr(&r.expr),
        })
        .collect();

    SerializedRuleSet {
        metadata: RuleSetMetadata {
            rule_count: ruleset.rules.len(),
            source_digest,
        },
        rules,
    }
}

fn serialized_to_ruleset(ser: SerializedRuleSet) -> Result<RuleSet, DeserializeError> {
    validate(&ser)?;

    let rules: Vec<CompiledRule> = ser
        .rules
        .into_iter()
        .map(|sr| CompiledRule {
            name: sr.name,
            description: sr.description,
            expr: deserialize_expr(sr.expr),
        })
        .collect();

    Ok(RuleSet { rules })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedRuleSet) -> Result<(), DeserializeError> {
    if ser.metadata.rule_count != ser.rules.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count,
            ser.rules.len()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for rule in &ser.rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(DeserializeError::Validation(format!(
                "duplicate rule name '{}'",
                rule.name
            )));
        }
        validate_expr(&rule.expr, &rule.name)?;
    }

    Ok(())
}

fn validate_expr(expr: &SerializedExpr, rule: &str) -> Result<(), DeserializeError> {
    match expr {
        SerializedExpr::Equality { left, right } => {
            validate_operand(left, rule)?;
            validate_operand(right, rule)
        }
        SerializedExpr::Exists {
            entity_type,
            conditions,
        }
        | SerializedExpr::Unique {
            entity_type,
            conditions,
        } => {
            if entity_type.is_empty() {
                return Err(DeserializeError::Validation(format!(
                    "rule '{rule}' has an empty entity type"
                )));
            }
            if conditions.is_empty() {
                return Err(DeserializeError::Validation(format!(
                    "rule '{rule}' has no conditions"
                )));
            }
            for condition in conditions {
                if condition.field.is_empty() {
                    return Err(DeserializeError::Validation(format!(
                        "rule '{rule}' has an empty condition field"
                    )));
                }
                validate_operand(&condition.value, rule)?;
            }
            Ok(())
        }
    }
}

fn validate_operand(operand: &SerializedOperand, rule: &str) -> Result<(), DeserializeError> {
    match operand {
        SerializedOperand::Field(_) | SerializedOperand::Literal(_) => Ok(()),
        SerializedOperand::Concat(parts) => {
            if parts.is_empty() {
                return Err(DeserializeError::Validation(format!(
                    "rule '{rule}' has an empty concatenation"
                )));
            }
            for part in parts {
                if matches!(part, SerializedOperand::Concat(_)) {
                    return Err(DeserializeError::Validation(format!(
                        "rule '{rule}' has a nested concatenation"
                    )));
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version (informational, not used for checks)
    // bytes[8..12] is flags (reserved)
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    ruleset: &RuleSet,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = ruleset_to_serialized(ruleset, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RuleSet, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    // Integrity check
    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleSet, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    serialized_to_ruleset(serialized)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
