//! `hsepartner-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, SequentialId, TransactionId, next_id};
