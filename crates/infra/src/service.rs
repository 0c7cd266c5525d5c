//! The application's single owner of ledger state.
//!
//! Every mutation goes through [`execute`] so the ledger only ever changes by
//! applying events its own `handle` produced. The service adds what the
//! aggregate must not know about: today's date and which item is open in the
//! detail view.

use std::io::Read;

use chrono::NaiveDate;
use thiserror::Error;

use hsepartner_core::{AggregateRoot, DomainError, DomainResult, ItemId, TransactionId};
use hsepartner_events::{Event, execute};
use hsepartner_inventory::{
    AddItem, CategoryAggregate, DeleteItem, DeleteTransaction, Direction, ImportItems,
    InventorySummary, ItemChange, ItemQuery, Ledger, LedgerCommand, LedgerEvent, NewItem,
    RecordTransaction, StockAlert, StockItem, Transaction, UpdateItem, view,
};

use crate::clock::{Clock, SystemClock};
use crate::csv::{self, CsvError, SkippedRow};

/// A stock movement as entered on the form. A missing date means today.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub item_id: ItemId,
    pub direction: Direction,
    pub quantity: f64,
    pub date: Option<NaiveDate>,
    pub user: String,
    pub notes: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// What a CSV import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Items that did not exist before the import.
    pub added: usize,
    /// Items that existed before the import and were overwritten.
    pub replaced: usize,
    /// Rows whose id an earlier row of the same file already used; the last one wins.
    pub repeated: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug)]
pub struct LedgerService<C = SystemClock> {
    ledger: Ledger,
    clock: C,
    selected: Option<ItemId>,
}

impl LedgerService<SystemClock> {
    pub fn new(ledger: Ledger) -> Self {
        Self::with_clock(ledger, SystemClock)
    }
}

impl<C: Clock> LedgerService<C> {
    pub fn with_clock(ledger: Ledger, clock: C) -> Self {
        Self {
            ledger,
            clock,
            selected: None,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn dispatch(&mut self, command: LedgerCommand) -> DomainResult<Vec<LedgerEvent>> {
        let span = tracing::info_span!("ledger.command", command = command_name(&command));
        let _guard = span.enter();

        let events = match execute(&mut self.ledger, &command) {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = %err, "command rejected");
                return Err(err);
            }
        };
        if events.is_empty() {
            tracing::debug!("command matched nothing");
        }
        for event in &events {
            tracing::info!(
                event_type = event.event_type(),
                event_version = event.version(),
                ledger_version = self.ledger.version(),
                "event applied"
            );
            if let LedgerEvent::ItemDeleted(e) = event {
                if self.selected == Some(e.item_id) {
                    self.selected = None;
                }
            }
        }
        Ok(events)
    }

    /// Add an item, returning its assigned id.
    pub fn add_item(&mut self, item: NewItem) -> DomainResult<ItemId> {
        let occurred_on = self.clock.today();
        let events = self.dispatch(LedgerCommand::AddItem(AddItem { item, occurred_on }))?;
        events
            .iter()
            .find_map(|e| match e {
                LedgerEvent::ItemAdded(added) => Some(added.item.id),
                _ => None,
            })
            .ok_or_else(|| DomainError::invariant("accepted add produced no item"))
    }

    /// Change one field. `Ok(false)` when the item does not exist.
    pub fn update_item(&mut self, item_id: ItemId, change: ItemChange) -> DomainResult<bool> {
        let occurred_on = self.clock.today();
        let events = self.dispatch(LedgerCommand::UpdateItem(UpdateItem {
            item_id,
            change,
            occurred_on,
        }))?;
        Ok(!events.is_empty())
    }

    pub fn delete_item(&mut self, item_id: ItemId, confirmed: bool) -> DomainResult<bool> {
        let events = self.dispatch(LedgerCommand::DeleteItem(DeleteItem { item_id, confirmed }))?;
        Ok(!events.is_empty())
    }

    /// Record a stock movement. `Ok(None)` when the item does not exist.
    pub fn record_transaction(&mut self, tx: NewTransaction) -> DomainResult<Option<TransactionId>> {
        let today = self.clock.today();
        let events = self.dispatch(LedgerCommand::RecordTransaction(RecordTransaction {
            item_id: tx.item_id,
            direction: tx.direction,
            quantity: tx.quantity,
            date: tx.date.unwrap_or(today),
            user: tx.user,
            notes: tx.notes,
            occurred_on: today,
        }))?;
        Ok(events.iter().find_map(|e| match e {
            LedgerEvent::TransactionRecorded(recorded) => Some(recorded.transaction.id),
            _ => None,
        }))
    }

    pub fn delete_transaction(
        &mut self,
        transaction_id: TransactionId,
        confirmed: bool,
    ) -> DomainResult<bool> {
        let occurred_on = self.clock.today();
        let events = self.dispatch(LedgerCommand::DeleteTransaction(DeleteTransaction {
            transaction_id,
            confirmed,
            occurred_on,
        }))?;
        Ok(!events.is_empty())
    }

    /// Parse `input` as CSV and merge the valid rows in one command.
    pub fn import_csv<R: Read>(&mut self, input: R) -> Result<ImportOutcome, ImportError> {
        let report = csv::parse_items(input, self.clock.today())?;
        let events = self.dispatch(LedgerCommand::ImportItems(ImportItems {
            items: report.items,
        }))?;

        let mut outcome = ImportOutcome {
            skipped: report.skipped,
            ..ImportOutcome::default()
        };
        for event in &events {
            match event {
                LedgerEvent::ItemImported(imported) if imported.repeated => outcome.repeated += 1,
                LedgerEvent::ItemImported(imported) if imported.replaced => outcome.replaced += 1,
                LedgerEvent::ItemImported(_) => outcome.added += 1,
                _ => {}
            }
        }
        tracing::info!(
            added = outcome.added,
            replaced = outcome.replaced,
            repeated = outcome.repeated,
            skipped = outcome.skipped.len(),
            "csv import finished"
        );
        Ok(outcome)
    }

    pub fn export_csv(&self) -> Result<String, CsvError> {
        csv::export_items(self.ledger.items())
    }

    pub fn csv_template(&self) -> Result<String, CsvError> {
        csv::template()
    }

    /// Open an item in the detail view. Unknown ids leave the selection as is.
    pub fn select_item(&mut self, item_id: ItemId) -> Option<&StockItem> {
        let item = self.ledger.item(item_id)?;
        self.selected = Some(item_id);
        Some(item)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_item(&self) -> Option<&StockItem> {
        self.selected.and_then(|id| self.ledger.item(id))
    }

    pub fn items(&self, query: &ItemQuery) -> Vec<&StockItem> {
        query.apply(self.ledger.items())
    }

    pub fn alerts(&self) -> Vec<StockAlert> {
        view::alerts(&self.ledger)
    }

    pub fn category_aggregates(&self) -> Vec<CategoryAggregate> {
        self.ledger.category_aggregates()
    }

    pub fn summary(&self) -> InventorySummary {
        view::summary(&self.ledger)
    }

    pub fn history(&self, item_id: ItemId) -> Vec<&Transaction> {
        view::history_for(&self.ledger, item_id)
    }

    pub fn categories(&self) -> Vec<&str> {
        view::categories(&self.ledger)
    }
}

fn command_name(command: &LedgerCommand) -> &'static str {
    match command {
        LedgerCommand::AddItem(_) => "add_item",
        LedgerCommand::UpdateItem(_) => "update_item",
        LedgerCommand::DeleteItem(_) => "delete_item",
        LedgerCommand::RecordTransaction(_) => "record_transaction",
        LedgerCommand::DeleteTransaction(_) => "delete_transaction",
        LedgerCommand::ImportItems(_) => "import_items",
    }
}
