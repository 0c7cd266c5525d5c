use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hsepartner_core::{DomainError, DomainResult, Entity, ItemId};

/// A stock line in the ledger.
///
/// `quantity` is never negative: commands that would store a negative, NaN or
/// infinite number are rejected, and stock-out movements clamp at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub min_quantity: f64,
    pub price: f64,
    pub location: String,
    pub last_updated: NaiveDate,
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl StockItem {
    /// Quantity × unit price.
    pub fn total_value(&self) -> f64 {
        self.quantity * self.price
    }

    /// Stock level relative to the item's minimum threshold.
    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.min_quantity)
    }

    pub(crate) fn apply_change(&mut self, change: &ItemChange) {
        match change {
            ItemChange::Name(v) => self.name = v.clone(),
            ItemChange::Category(v) => self.category = v.clone(),
            ItemChange::Quantity(v) => self.quantity = *v,
            ItemChange::Unit(v) => self.unit = v.clone(),
            ItemChange::MinQuantity(v) => self.min_quantity = *v,
            ItemChange::Price(v) => self.price = *v,
            ItemChange::Location(v) => self.location = v.clone(),
        }
    }

    /// Checks every field a record must satisfy to live in the ledger.
    pub fn validate(&self) -> DomainResult<()> {
        validate_record(
            &self.name,
            &self.category,
            &self.unit,
            [self.quantity, self.min_quantity, self.price],
        )
    }
}

/// Input for a new stock item; the ledger assigns id and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub min_quantity: f64,
    pub price: f64,
    pub location: String,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate_record(
            &self.name,
            &self.category,
            &self.unit,
            [self.quantity, self.min_quantity, self.price],
        )
    }

    pub fn into_item(self, id: ItemId, last_updated: NaiveDate) -> StockItem {
        StockItem {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            min_quantity: self.min_quantity,
            price: self.price,
            location: self.location,
            last_updated,
        }
    }
}

/// A single-field edit of a stock item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ItemChange {
    Name(String),
    Category(String),
    Quantity(f64),
    Unit(String),
    MinQuantity(f64),
    Price(f64),
    Location(String),
}

impl ItemChange {
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            ItemChange::Name(v) => require_text("name", v),
            ItemChange::Category(v) => require_text("category", v),
            ItemChange::Unit(v) => require_text("unit", v),
            ItemChange::Quantity(v) => require_amount("quantity", *v),
            ItemChange::MinQuantity(v) => require_amount("min_quantity", *v),
            ItemChange::Price(v) => require_amount("price", *v),
            ItemChange::Location(_) => Ok(()),
        }
    }
}

/// Stock level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Normal,
    /// At or below the minimum threshold.
    Warning,
    /// Below half the minimum threshold.
    Critical,
}

impl StockStatus {
    pub fn classify(quantity: f64, min_quantity: f64) -> Self {
        if quantity > min_quantity {
            StockStatus::Normal
        } else if quantity < min_quantity * 0.5 {
            StockStatus::Critical
        } else {
            StockStatus::Warning
        }
    }

    pub fn is_low(self) -> bool {
        self != StockStatus::Normal
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockStatus::Normal => write!(f, "normal"),
            StockStatus::Warning => write!(f, "warning"),
            StockStatus::Critical => write!(f, "critical"),
        }
    }
}

fn validate_record(name: &str, category: &str, unit: &str, amounts: [f64; 3]) -> DomainResult<()> {
    require_text("name", name)?;
    require_text("category", category)?;
    require_text("unit", unit)?;
    let [quantity, min_quantity, price] = amounts;
    require_amount("quantity", quantity)?;
    require_amount("min_quantity", min_quantity)?;
    require_amount("price", price)?;
    Ok(())
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_amount(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(StockStatus::classify(21.0, 20.0), StockStatus::Normal);
        assert_eq!(StockStatus::classify(20.0, 20.0), StockStatus::Warning);
        assert_eq!(StockStatus::classify(10.0, 20.0), StockStatus::Warning);
        assert_eq!(StockStatus::classify(9.5, 20.0), StockStatus::Critical);
        assert_eq!(StockStatus::classify(0.0, 0.0), StockStatus::Warning);
    }

    #[test]
    fn change_validation_rejects_blank_and_negative() {
        assert!(ItemChange::Name("  ".to_string()).validate().is_err());
        assert!(ItemChange::Quantity(-1.0).validate().is_err());
        assert!(ItemChange::Price(f64::NAN).validate().is_err());
        assert!(ItemChange::Location(String::new()).validate().is_ok());
        assert!(ItemChange::MinQuantity(0.0).validate().is_ok());
    }
}
