//! Demo stockroom used when the application starts without data.

use chrono::NaiveDate;

use hsepartner_core::{ItemId, TransactionId};

use crate::category::{CategoryColor, CategoryPalette};
use crate::item::StockItem;
use crate::ledger::Ledger;
use crate::transaction::{Direction, Transaction};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: u64,
    name: &str,
    category: &str,
    quantity: f64,
    unit: &str,
    min_quantity: f64,
    price: f64,
    location: &str,
    last_updated: NaiveDate,
) -> StockItem {
    StockItem {
        id: ItemId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        quantity,
        unit: unit.to_string(),
        min_quantity,
        price,
        location: location.to_string(),
        last_updated,
    }
}

fn movement(
    id: u64,
    item_id: u64,
    direction: Direction,
    quantity: f64,
    date: NaiveDate,
    user: &str,
    notes: &str,
) -> Transaction {
    Transaction {
        id: TransactionId::new(id),
        item_id: ItemId::new(item_id),
        direction,
        quantity,
        date,
        user: user.to_string(),
        notes: notes.to_string(),
    }
}

pub fn demo_items() -> Vec<StockItem> {
    vec![
        item(1, "Safety Helmets", "Personal Protective Equipment", 50.0, "pieces", 20.0, 25.0, "Safety Storage", date(2023, 8, 1)),
        item(2, "NPK Fertilizer", "Fertilizers", 800.0, "kg", 200.0, 1.2, "Main Warehouse", date(2023, 7, 15)),
        item(3, "Herbicide RoundUp", "Chemicals", 50.0, "L", 20.0, 15.0, "Secure Chemical Storage", date(2023, 8, 10)),
        item(4, "Diesel Fuel", "Fuels", 350.0, "L", 100.0, 1.8, "External Tank", date(2023, 8, 18)),
        item(5, "Corn Seeds", "Seeds", 80.0, "kg", 100.0, 4.5, "Main Warehouse", date(2023, 7, 22)),
        item(6, "Motor Oil", "Lubricants", 25.0, "L", 10.0, 5.2, "Workshop", date(2023, 6, 30)),
        item(7, "Baling Twine", "Consumables", 15.0, "rolls", 5.0, 25.0, "Equipment Storage", date(2023, 7, 5)),
    ]
}

pub fn demo_transactions() -> Vec<Transaction> {
    use Direction::{In, Out};
    vec![
        movement(1, 1, Out, 5.0, date(2023, 8, 20), "John Smith", "Safety training session"),
        movement(2, 2, Out, 200.0, date(2023, 8, 18), "John Smith", "Field application east section"),
        movement(3, 4, In, 500.0, date(2023, 8, 18), "Mary Johnson", "Monthly delivery"),
        movement(4, 3, Out, 5.0, date(2023, 8, 15), "John Smith", "Weed control south field"),
        movement(5, 1, In, 20.0, date(2023, 8, 10), "Mary Johnson", "Additional purchase"),
        movement(6, 6, Out, 5.0, date(2023, 8, 5), "Peter Wilson", "Tractor maintenance"),
    ]
}

pub fn demo_palette() -> CategoryPalette {
    let mut palette = CategoryPalette::new();
    for (name, color) in [
        ("Personal Protective Equipment", "#4CAF50"),
        ("Fertilizers", "#8D6E63"),
        ("Chemicals", "#F44336"),
        ("Fuels", "#2196F3"),
        ("Lubricants", "#FFC107"),
        ("Consumables", "#9C27B0"),
    ] {
        palette.register(name, CategoryColor::new(color));
    }
    palette
}

/// The demo items, movements and category colours as one ledger.
pub fn demo_ledger() -> Ledger {
    Ledger::from_parts(demo_items(), demo_transactions(), demo_palette())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_passes_restore_checks() {
        let ledger = Ledger::restore(demo_items(), demo_transactions(), demo_palette()).unwrap();
        assert_eq!(ledger, demo_ledger());
        assert!(ledger.palette().contains("Seeds"));
    }
}
