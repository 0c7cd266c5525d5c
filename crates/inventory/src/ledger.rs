use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hsepartner_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Entity, ItemId, SequentialId,
    TransactionId, next_id, position_of,
};
use hsepartner_events::Event;

use crate::category::{self, CategoryAggregate, CategoryColor, CategoryPalette};
use crate::item::{ItemChange, NewItem, StockItem};
use crate::transaction::{Direction, Transaction};

/// Ledger identifier (one ledger per running application).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerId(pub u64);

/// Aggregate root: the stock ledger.
///
/// # Invariants
/// - Item ids and transaction ids are unique.
/// - Every stored item passes [`StockItem::validate`]; in particular no
///   quantity is ever negative.
/// - Every item category has a palette colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    id: LedgerId,
    items: Vec<StockItem>,
    transactions: Vec<Transaction>,
    palette: CategoryPalette,
    version: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            id: LedgerId::default(),
            items: Vec::new(),
            transactions: Vec::new(),
            palette: CategoryPalette::new(),
            version: 0,
        }
    }

    /// Rebuild a ledger from previously captured records.
    ///
    /// Categories missing from `palette` get a colour assigned.
    pub fn restore(
        items: Vec<StockItem>,
        transactions: Vec<Transaction>,
        palette: CategoryPalette,
    ) -> DomainResult<Self> {
        let mut seen_items = HashSet::new();
        for item in &items {
            item.validate()?;
            if !seen_items.insert(item.id) {
                return Err(DomainError::invariant(format!("duplicate item id {}", item.id)));
            }
        }

        let mut seen_transactions = HashSet::new();
        for tx in &transactions {
            if !(tx.quantity.is_finite() && tx.quantity > 0.0) {
                return Err(DomainError::validation(format!(
                    "transaction {} quantity must be positive",
                    tx.id
                )));
            }
            if !seen_transactions.insert(tx.id) {
                return Err(DomainError::invariant(format!("duplicate transaction id {}", tx.id)));
            }
        }

        Ok(Self::from_parts(items, transactions, palette))
    }

    pub(crate) fn from_parts(
        items: Vec<StockItem>,
        transactions: Vec<Transaction>,
        mut palette: CategoryPalette,
    ) -> Self {
        for item in &items {
            palette.register(item.category.clone(), CategoryColor::for_category(&item.category));
        }
        Self {
            id: LedgerId::default(),
            items,
            transactions,
            palette,
            version: 0,
        }
    }

    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&StockItem> {
        position_of(&self.items, &id).map(|i| &self.items[i])
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        position_of(&self.transactions, &id).map(|i| &self.transactions[i])
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    /// Per-category totals, recomputed from the current items.
    pub fn category_aggregates(&self) -> Vec<CategoryAggregate> {
        category::aggregate(&self.items, &self.palette)
    }

    pub fn next_item_id(&self) -> ItemId {
        next_id(self.items.iter().map(|i| *i.id()))
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        next_id(self.transactions.iter().map(|t| *t.id()))
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItem {
    pub item: NewItem,
    pub occurred_on: NaiveDate,
}

/// Command: UpdateItem (one field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub item_id: ItemId,
    pub change: ItemChange,
    pub occurred_on: NaiveDate,
}

/// Command: DeleteItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub item_id: ItemId,
    pub confirmed: bool,
}

/// Command: RecordTransaction (stock in / stock out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTransaction {
    pub item_id: ItemId,
    pub direction: Direction,
    pub quantity: f64,
    /// Date of the movement as entered.
    pub date: NaiveDate,
    pub user: String,
    pub notes: String,
    /// Stamped on the item as its last update.
    pub occurred_on: NaiveDate,
}

/// Command: DeleteTransaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransaction {
    pub transaction_id: TransactionId,
    pub confirmed: bool,
    pub occurred_on: NaiveDate,
}

/// An externally parsed item. Without an id it is appended under a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedItem {
    pub id: Option<ItemId>,
    pub record: NewItem,
    pub last_updated: NaiveDate,
}

/// Command: ImportItems (merge by id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItems {
    pub items: Vec<ImportedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddItem(AddItem),
    UpdateItem(UpdateItem),
    DeleteItem(DeleteItem),
    RecordTransaction(RecordTransaction),
    DeleteTransaction(DeleteTransaction),
    ImportItems(ImportItems),
}

/// Event: CategoryRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistered {
    pub name: String,
    pub color: CategoryColor,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: StockItem,
}

/// Event: ItemUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: ItemId,
    pub change: ItemChange,
    pub occurred_on: NaiveDate,
}

/// Event: ItemDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub item_id: ItemId,
}

/// Event: TransactionRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecorded {
    pub transaction: Transaction,
}

/// Event: TransactionDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDeleted {
    pub transaction_id: TransactionId,
}

/// Event: ItemImported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemImported {
    pub item: StockItem,
    /// An item with this id existed before the import.
    pub replaced: bool,
    /// An earlier row of the same import already carried this id.
    pub repeated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    CategoryRegistered(CategoryRegistered),
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemDeleted(ItemDeleted),
    TransactionRecorded(TransactionRecorded),
    TransactionDeleted(TransactionDeleted),
    ItemImported(ItemImported),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::CategoryRegistered(_) => "inventory.category.registered",
            LedgerEvent::ItemAdded(_) => "inventory.item.added",
            LedgerEvent::ItemUpdated(_) => "inventory.item.updated",
            LedgerEvent::ItemDeleted(_) => "inventory.item.deleted",
            LedgerEvent::TransactionRecorded(_) => "inventory.transaction.recorded",
            LedgerEvent::TransactionDeleted(_) => "inventory.transaction.deleted",
            LedgerEvent::ItemImported(_) => "inventory.item.imported",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::CategoryRegistered(e) => {
                self.palette.register(e.name.clone(), e.color.clone());
            }
            LedgerEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
            }
            LedgerEvent::ItemUpdated(e) => {
                if let Some(i) = position_of(&self.items, &e.item_id) {
                    let item = &mut self.items[i];
                    item.apply_change(&e.change);
                    item.last_updated = e.occurred_on;
                }
            }
            LedgerEvent::ItemDeleted(e) => {
                self.items.retain(|item| item.id != e.item_id);
            }
            LedgerEvent::TransactionRecorded(e) => {
                self.transactions.push(e.transaction.clone());
            }
            LedgerEvent::TransactionDeleted(e) => {
                self.transactions.retain(|tx| tx.id != e.transaction_id);
            }
            LedgerEvent::ItemImported(e) => match position_of(&self.items, &e.item.id) {
                Some(i) => self.items[i] = e.item.clone(),
                None => self.items.push(e.item.clone()),
            },
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::AddItem(cmd) => self.handle_add(cmd),
            LedgerCommand::UpdateItem(cmd) => self.handle_update(cmd),
            LedgerCommand::DeleteItem(cmd) => self.handle_delete(cmd),
            LedgerCommand::RecordTransaction(cmd) => self.handle_record(cmd),
            LedgerCommand::DeleteTransaction(cmd) => self.handle_delete_transaction(cmd),
            LedgerCommand::ImportItems(cmd) => self.handle_import(cmd),
        }
    }
}

impl Ledger {
    /// Pushes a `CategoryRegistered` event unless the category is known or
    /// already registered earlier in the same command.
    fn register_category(&self, category: &str, pending: &mut Vec<String>, events: &mut Vec<LedgerEvent>) {
        if self.palette.contains(category) || pending.iter().any(|c| c == category) {
            return;
        }
        pending.push(category.to_string());
        events.push(LedgerEvent::CategoryRegistered(CategoryRegistered {
            name: category.to_string(),
            color: CategoryColor::for_category(category),
        }));
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<LedgerEvent>, DomainError> {
        let item = cmd.item.clone().into_item(self.next_item_id(), cmd.occurred_on);
        item.validate()?;

        let mut events = Vec::new();
        self.register_category(&item.category, &mut Vec::new(), &mut events);
        events.push(LedgerEvent::ItemAdded(ItemAdded { item }));
        Ok(events)
    }

    fn handle_update(&self, cmd: &UpdateItem) -> Result<Vec<LedgerEvent>, DomainError> {
        cmd.change.validate()?;
        if self.item(cmd.item_id).is_none() {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        if let ItemChange::Category(category) = &cmd.change {
            self.register_category(category, &mut Vec::new(), &mut events);
        }
        events.push(LedgerEvent::ItemUpdated(ItemUpdated {
            item_id: cmd.item_id,
            change: cmd.change.clone(),
            occurred_on: cmd.occurred_on,
        }));
        Ok(events)
    }

    fn handle_delete(&self, cmd: &DeleteItem) -> Result<Vec<LedgerEvent>, DomainError> {
        if !cmd.confirmed {
            return Err(DomainError::confirmation_required(format!(
                "deleting item {}",
                cmd.item_id
            )));
        }
        if self.item(cmd.item_id).is_none() {
            return Ok(Vec::new());
        }
        Ok(vec![LedgerEvent::ItemDeleted(ItemDeleted { item_id: cmd.item_id })])
    }

    fn handle_record(&self, cmd: &RecordTransaction) -> Result<Vec<LedgerEvent>, DomainError> {
        if !(cmd.quantity.is_finite() && cmd.quantity > 0.0) {
            return Err(DomainError::validation("quantity must be a positive number"));
        }
        let Some(item) = self.item(cmd.item_id) else {
            return Ok(Vec::new());
        };

        let transaction = Transaction {
            id: self.next_transaction_id(),
            item_id: cmd.item_id,
            direction: cmd.direction,
            quantity: cmd.quantity,
            date: cmd.date,
            user: cmd.user.clone(),
            notes: cmd.notes.clone(),
        };
        let new_quantity = cmd.direction.apply(item.quantity, cmd.quantity);

        Ok(vec![
            LedgerEvent::TransactionRecorded(TransactionRecorded { transaction }),
            LedgerEvent::ItemUpdated(ItemUpdated {
                item_id: cmd.item_id,
                change: ItemChange::Quantity(new_quantity),
                occurred_on: cmd.occurred_on,
            }),
        ])
    }

    fn handle_delete_transaction(
        &self,
        cmd: &DeleteTransaction,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        if !cmd.confirmed {
            return Err(DomainError::confirmation_required(format!(
                "deleting transaction {}",
                cmd.transaction_id
            )));
        }
        let Some(tx) = self.transaction(cmd.transaction_id) else {
            return Ok(Vec::new());
        };

        let mut events = vec![LedgerEvent::TransactionDeleted(TransactionDeleted {
            transaction_id: tx.id,
        })];
        if let Some(item) = self.item(tx.item_id) {
            events.push(LedgerEvent::ItemUpdated(ItemUpdated {
                item_id: item.id,
                change: ItemChange::Quantity(tx.direction.reverse(item.quantity, tx.quantity)),
                occurred_on: cmd.occurred_on,
            }));
        }
        Ok(events)
    }

    fn handle_import(&self, cmd: &ImportItems) -> Result<Vec<LedgerEvent>, DomainError> {
        let existing: HashSet<ItemId> = self.items.iter().map(|i| i.id).collect();
        let mut fresh = next_id(
            existing
                .iter()
                .copied()
                .chain(cmd.items.iter().filter_map(|i| i.id)),
        );

        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        let mut events = Vec::new();
        for imported in &cmd.items {
            let id = match imported.id {
                Some(id) if id < ItemId::first() => {
                    return Err(DomainError::invalid_id(format!("item id {id} is below 1")));
                }
                Some(id) => id,
                None => {
                    let id = fresh;
                    fresh = fresh.next();
                    id
                }
            };
            let item = imported.record.clone().into_item(id, imported.last_updated);
            item.validate()?;

            self.register_category(&item.category, &mut pending, &mut events);
            events.push(LedgerEvent::ItemImported(ItemImported {
                item,
                replaced: existing.contains(&id),
                repeated: !seen.insert(id),
            }));
        }
        Ok(events)
    }
}
