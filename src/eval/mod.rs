//! # Packet Evaluation
//!
//! Read-only traversals over a decoded packet tree.
//!
//! - [`version_sum`] adds up the version field of every packet in the tree.
//! - [`evaluate`] computes the expression the tree encodes.
//!
//! | Type ID | Operator | Value |
//! |---|---|---|
//! | 0 | sum | sum of sub-packet values |
//! | 1 | product | product of sub-packet values |
//! | 2 | minimum | smallest sub-packet value |
//! | 3 | maximum | largest sub-packet value |
//! | 4 | literal | the literal value |
//! | 5 | greater-than | 1 if first > second, else 0 |
//! | 6 | less-than | 1 if first < second, else 0 |
//! | 7 | equal-to | 1 if first == second, else 0 |
//!
//! Arithmetic is checked: a sum or product that leaves the 64-bit range is an
//! error rather than a wrapped value.

use crate::core::packet::{Operator, Packet};
use crate::error::{constants, DecodeError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Both answers for one transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub version_sum: u64,
    pub value: u64,
}

/// Sum of the version numbers of `packet` and all of its descendants.
pub fn version_sum(packet: &Packet) -> u64 {
    u64::from(packet.version()) + packet.children().iter().map(version_sum).sum::<u64>()
}

/// Evaluate the expression rooted at `packet`.
///
/// # Errors
/// - `DecodeError::InvalidArity` when a comparison does not have exactly two
///   sub-packets, or a minimum/maximum has none
/// - `DecodeError::Overflow` when a sum or product exceeds `u64::MAX`
pub fn evaluate(packet: &Packet) -> Result<u64> {
    match packet {
        Packet::Literal { value, .. } => Ok(*value),
        Packet::Operator {
            operator, children, ..
        } => apply(*operator, children),
    }
}

fn apply(operator: Operator, children: &[Packet]) -> Result<u64> {
    match operator {
        Operator::Sum => children.iter().try_fold(0u64, |acc, child| {
            acc.checked_add(evaluate(child)?)
                .ok_or_else(|| DecodeError::Overflow(constants::ERR_SUM_OVERFLOW.to_string()))
        }),
        Operator::Product => children.iter().try_fold(1u64, |acc, child| {
            acc.checked_mul(evaluate(child)?)
                .ok_or_else(|| DecodeError::Overflow(constants::ERR_PRODUCT_OVERFLOW.to_string()))
        }),
        Operator::Minimum | Operator::Maximum => {
            if children.is_empty() {
                return Err(arity_error(operator, "at least 1", 0));
            }
            let values = children.iter().map(evaluate).collect::<Result<Vec<_>>>()?;
            let extreme = if operator == Operator::Minimum {
                values.into_iter().min()
            } else {
                values.into_iter().max()
            };
            // Non-empty checked above
            Ok(extreme.unwrap_or_default())
        }
        Operator::GreaterThan | Operator::LessThan | Operator::EqualTo => {
            let [lhs, rhs] = children else {
                return Err(arity_error(operator, "exactly 2", children.len()));
            };
            let (lhs, rhs) = (evaluate(lhs)?, evaluate(rhs)?);
            let holds = match operator {
                Operator::GreaterThan => lhs > rhs,
                Operator::LessThan => lhs < rhs,
                _ => lhs == rhs,
            };
            Ok(u64::from(holds))
        }
    }
}

fn arity_error(operator: Operator, expected: &str, found: usize) -> DecodeError {
    DecodeError::InvalidArity {
        operator: operator.name().to_string(),
        expected: expected.to_string(),
        found,
    }
}

/// Compute both answers for a decoded tree.
pub fn solve(packet: &Packet) -> Result<Evaluation> {
    let evaluation = Evaluation {
        version_sum: version_sum(packet),
        value: evaluate(packet)?,
    };
    debug!(
        version_sum = evaluation.version_sum,
        value = evaluation.value,
        "Evaluated packet tree"
    );
    Ok(evaluation)
}
