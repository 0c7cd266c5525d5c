//! Inventory domain module.
//!
//! Business rules for the stock ledger, implemented purely as deterministic
//! domain logic (no IO, no clocks, no storage).

pub mod category;
pub mod item;
pub mod ledger;
pub mod seed;
pub mod transaction;
pub mod view;

pub use category::{CategoryAggregate, CategoryColor, CategoryPalette};
pub use item::{ItemChange, NewItem, StockItem, StockStatus};
pub use ledger::{
    AddItem, CategoryRegistered, DeleteItem, DeleteTransaction, ImportItems, ImportedItem,
    ItemAdded, ItemDeleted, ItemImported, ItemUpdated, Ledger, LedgerCommand, LedgerEvent,
    LedgerId, RecordTransaction, TransactionDeleted, TransactionRecorded, UpdateItem,
};
pub use transaction::{Direction, Transaction};
pub use view::{
    CategoryFilter, InventorySummary, ItemQuery, SortKey, SortOrder, StockAlert, alerts,
    categories, history_for, summary,
};
