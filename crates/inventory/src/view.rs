//! Read-side projections over a [`Ledger`]. Nothing here mutates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use hsepartner_core::ItemId;

use crate::item::{StockItem, StockStatus};
use crate::ledger::Ledger;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Quantity,
    Price,
    LastUpdated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

/// Search, filter and ordering for the item list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    /// Case-insensitive substring matched against name and category.
    pub search: String,
    pub category: CategoryFilter,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl ItemQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = CategoryFilter::Only(category.into());
        self
    }

    pub fn sort(mut self, sort_by: SortKey, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }

    pub fn matches(&self, item: &StockItem) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = item.name.to_lowercase().contains(&term)
            || item.category.to_lowercase().contains(&term);

        match &self.category {
            CategoryFilter::All => matches_search,
            CategoryFilter::Only(category) => matches_search && item.category == *category,
        }
    }

    /// Matching items in query order. Ties fall back to id, and `Desc` is the
    /// exact reverse of `Asc`.
    pub fn apply<'a>(&self, items: &'a [StockItem]) -> Vec<&'a StockItem> {
        let mut out: Vec<&StockItem> = items.iter().filter(|i| self.matches(i)).collect();
        out.sort_by(|a, b| compare(a, b, self.sort_by).then_with(|| a.id.cmp(&b.id)));
        if self.order == SortOrder::Desc {
            out.reverse();
        }
        out
    }
}

fn compare(a: &StockItem, b: &StockItem, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Quantity => a.quantity.total_cmp(&b.quantity),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::LastUpdated => a.last_updated.cmp(&b.last_updated),
    }
}

/// An item at or below its minimum threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    pub item_id: ItemId,
    pub name: String,
    pub current: f64,
    pub min: f64,
    pub status: StockStatus,
}

/// Low-stock alerts in ledger order.
pub fn alerts(ledger: &Ledger) -> Vec<StockAlert> {
    ledger
        .items()
        .iter()
        .filter(|item| item.status().is_low())
        .map(|item| StockAlert {
            item_id: item.id,
            name: item.name.clone(),
            current: item.quantity,
            min: item.min_quantity,
            status: item.status(),
        })
        .collect()
}

/// Movements of one item, newest date first.
pub fn history_for(ledger: &Ledger, item_id: ItemId) -> Vec<&Transaction> {
    let mut out: Vec<&Transaction> = ledger
        .transactions()
        .iter()
        .filter(|t| t.item_id == item_id)
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    out
}

/// Distinct categories, first-seen order.
pub fn categories(ledger: &Ledger) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for item in ledger.items() {
        if !out.contains(&item.category.as_str()) {
            out.push(&item.category);
        }
    }
    out
}

/// Headline figures for the stock dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub categories: usize,
    pub total_quantity: f64,
    pub total_value: f64,
    /// Items at or below their threshold, critical ones included.
    pub low_stock: usize,
    pub critical: usize,
}

pub fn summary(ledger: &Ledger) -> InventorySummary {
    let items = ledger.items();
    InventorySummary {
        total_items: items.len(),
        categories: categories(ledger).len(),
        total_quantity: items.iter().map(|i| i.quantity).sum(),
        total_value: items.iter().map(StockItem::total_value).sum(),
        low_stock: items.iter().filter(|i| i.status().is_low()).count(),
        critical: items.iter().filter(|i| i.status() == StockStatus::Critical).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use proptest::prelude::*;

    #[test]
    fn category_filter_keeps_only_that_category() {
        let ledger = seed::demo_ledger();
        let query = ItemQuery::default().category("Fuels");
        let items = query.apply(ledger.items());
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|i| i.category == "Fuels"));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_category() {
        let ledger = seed::demo_ledger();

        let by_name = ItemQuery::default().search("HELMET");
        let names: Vec<_> = by_name.apply(ledger.items()).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Safety Helmets"]);

        let by_category = ItemQuery::default().search("fert");
        let names: Vec<_> =
            by_category.apply(ledger.items()).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["NPK Fertilizer"]);
    }

    #[test]
    fn search_and_category_combine() {
        let ledger = seed::demo_ledger();
        let query = ItemQuery::default().search("oil").category("Fuels");
        assert!(query.apply(ledger.items()).is_empty());
    }

    #[test]
    fn sorts_by_date_and_price() {
        let ledger = seed::demo_ledger();

        let newest = ItemQuery::default().sort(SortKey::LastUpdated, SortOrder::Desc);
        assert_eq!(newest.apply(ledger.items())[0].name, "Diesel Fuel");

        let cheapest = ItemQuery::default().sort(SortKey::Price, SortOrder::Asc);
        assert_eq!(cheapest.apply(ledger.items())[0].name, "NPK Fertilizer");
    }

    #[test]
    fn alerts_flag_warning_and_critical() {
        let ledger = seed::demo_ledger();
        let alerts = alerts(&ledger);
        let corn = alerts.iter().find(|a| a.name == "Corn Seeds").unwrap();
        assert_eq!(corn.status, StockStatus::Warning);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn history_is_newest_first() {
        let ledger = seed::demo_ledger();
        let history = history_for(&ledger, ItemId::new(1));
        let dates: Vec<_> = history.iter().map(|t| t.date.to_string()).collect();
        assert_eq!(dates, ["2023-08-20", "2023-08-10"]);
    }

    #[test]
    fn summary_counts() {
        let ledger = seed::demo_ledger();
        let s = summary(&ledger);
        assert_eq!(s.total_items, 7);
        assert_eq!(s.categories, 7);
        assert_eq!(s.low_stock, 1);
        assert_eq!(s.critical, 0);
    }

    #[test]
    fn low_stock_includes_critical_items() {
        let ledger = Ledger::restore(
            vec![item(1, 5), item(2, 15), item(3, 40)],
            Vec::new(),
            crate::category::CategoryPalette::new(),
        )
        .unwrap();
        let s = summary(&ledger);
        assert_eq!(s.low_stock, 2);
        assert_eq!(s.critical, 1);
        assert_eq!(s.low_stock, alerts(&ledger).len());
    }

    fn item(id: u64, quantity: u32) -> StockItem {
        let mut item = seed::demo_ledger().items()[0].clone();
        item.id = ItemId::new(id);
        item.quantity = f64::from(quantity);
        item
    }

    proptest! {
        /// Property: descending order is the exact reverse of ascending.
        #[test]
        fn quantity_desc_reverses_asc(quantities in prop::collection::vec(0u32..50, 0..30)) {
            let items: Vec<StockItem> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| item(i as u64 + 1, *q))
                .collect();

            let asc = ItemQuery::default().sort(SortKey::Quantity, SortOrder::Asc).apply(&items);
            let mut desc = ItemQuery::default().sort(SortKey::Quantity, SortOrder::Desc).apply(&items);
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }
    }
}
