//! Strongly-typed identifiers used across the domain.
//!
//! Ledger records are numbered sequentially: a new record takes one more than
//! the largest id currently in use, or 1 when there is none.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stock item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

/// Identifier of a stock movement (transaction).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

/// An identifier drawn from an increasing integer sequence.
pub trait SequentialId: Copy + Ord {
    /// The id handed out when nothing exists yet.
    fn first() -> Self;

    /// The id following `self`.
    fn next(self) -> Self;
}

/// Next free id after every id in `existing` (max + 1, or `first()` if empty).
pub fn next_id<I, It>(existing: It) -> I
where
    I: SequentialId,
    It: IntoIterator<Item = I>,
{
    existing
        .into_iter()
        .max()
        .map_or_else(I::first, SequentialId::next)
}

macro_rules! impl_sequential_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl SequentialId for $t {
            fn first() -> Self {
                Self(1)
            }

            fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = u64::from_str(s.trim())
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_sequential_newtype!(ItemId, "ItemId");
impl_sequential_newtype!(TransactionId, "TransactionId");
