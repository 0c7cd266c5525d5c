//! Per-category quantity totals and their display colours.
//!
//! Totals are always recomputed from the items; the palette is the only
//! category state the ledger keeps.

use serde::{Deserialize, Serialize};

use crate::item::StockItem;

/// Colours handed out to categories.
pub const PALETTE: [&str; 8] = [
    "#4CAF50", "#8D6E63", "#F44336", "#2196F3", "#FFC107", "#9C27B0", "#FF5722", "#3F51B5",
];

/// A display colour (CSS hex string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryColor(String);

impl CategoryColor {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pseudo-random palette pick, stable for a given category name.
    pub fn for_category(name: &str) -> Self {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in name.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        let index = (hash % PALETTE.len() as u64) as usize;
        Self::new(PALETTE[index])
    }
}

impl core::fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category name → colour, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPalette {
    entries: Vec<(String, CategoryColor)>,
}

impl CategoryPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == category)
    }

    pub fn color_of(&self, category: &str) -> Option<&CategoryColor> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, color)| color)
    }

    /// Keeps an existing colour; only unseen categories are added.
    pub fn register(&mut self, category: impl Into<String>, color: CategoryColor) {
        let category = category.into();
        if !self.contains(&category) {
            self.entries.push((category, color));
        }
    }
}

/// Summed quantity of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub name: String,
    pub value: f64,
    pub color: CategoryColor,
}

/// Totals for every category that currently has items, in first-seen order.
pub fn aggregate<'a>(
    items: impl IntoIterator<Item = &'a StockItem>,
    palette: &CategoryPalette,
) -> Vec<CategoryAggregate> {
    let mut out: Vec<CategoryAggregate> = Vec::new();
    for item in items {
        match out.iter_mut().find(|agg| agg.name == item.category) {
            Some(agg) => agg.value += item.quantity,
            None => out.push(CategoryAggregate {
                name: item.category.clone(),
                value: item.quantity,
                color: palette
                    .color_of(&item.category)
                    .cloned()
                    .unwrap_or_else(|| CategoryColor::for_category(&item.category)),
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_pick_is_stable_and_from_palette() {
        let a = CategoryColor::for_category("Chemicals");
        let b = CategoryColor::for_category("Chemicals");
        assert_eq!(a, b);
        assert!(PALETTE.contains(&a.as_str()));
    }

    #[test]
    fn register_keeps_first_colour() {
        let mut palette = CategoryPalette::new();
        palette.register("PPE", CategoryColor::new("#4CAF50"));
        palette.register("PPE", CategoryColor::new("#000000"));
        assert_eq!(palette.color_of("PPE").map(CategoryColor::as_str), Some("#4CAF50"));

        let mut once = CategoryPalette::new();
        once.register("PPE", CategoryColor::new("#4CAF50"));
        assert_eq!(palette, once);
    }
}
