use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hsepartner_core::{Entity, ItemId, TransactionId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock received; increases quantity.
    In,
    /// Stock issued; decreases quantity, floored at zero.
    Out,
}

impl Direction {
    /// Quantity after moving `amount` in this direction from `current`.
    pub fn apply(self, current: f64, amount: f64) -> f64 {
        match self {
            Direction::In => current + amount,
            Direction::Out => (current - amount).max(0.0),
        }
    }

    /// Quantity after undoing a movement of `amount` in this direction.
    ///
    /// Exact for whole quantities. Fractional amounts go through `f64`
    /// arithmetic, so undoing a movement may leave a rounding residue.
    pub fn reverse(self, current: f64, amount: f64) -> f64 {
        match self {
            Direction::In => (current - amount).max(0.0),
            Direction::Out => current + amount,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// A recorded stock movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub item_id: ItemId,
    pub direction: Direction,
    pub quantity: f64,
    pub date: NaiveDate,
    /// Free text; not linked to the signed-in account.
    pub user: String,
    pub notes: String,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_undoes_whole_movements_exactly() {
        for direction in [Direction::In, Direction::Out] {
            let moved = direction.apply(50.0, 35.0);
            assert_eq!(direction.reverse(moved, 35.0), 50.0);
        }
    }

    #[test]
    fn reverse_of_fractional_movement_is_within_rounding() {
        let moved = Direction::In.apply(0.1, 0.2);
        let restored = Direction::In.reverse(moved, 0.2);
        assert!((restored - 0.1).abs() < 1e-12);
    }

    #[test]
    fn floored_stock_out_is_not_undone_exactly() {
        let moved = Direction::Out.apply(10.0, 35.0);
        assert_eq!(moved, 0.0);
        assert_eq!(Direction::Out.reverse(moved, 35.0), 35.0);
    }
}
