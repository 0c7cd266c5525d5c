//! CSV import/export of stock items.
//!
//! Export writes one row per item under a fixed header. Import is
//! header-driven, tolerates column reordering and an extra `id` column, and
//! skips rows it cannot turn into a valid item instead of failing the file.

use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hsepartner_core::{DomainError, DomainResult, ItemId, SequentialId};
use hsepartner_inventory::{ImportedItem, NewItem, StockItem};

/// Column order of exported files and the download template.
pub const HEADER: [&str; 8] = [
    "name",
    "category",
    "quantity",
    "unit",
    "minQuantity",
    "price",
    "location",
    "lastUpdated",
];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    name: &'a str,
    category: &'a str,
    quantity: f64,
    unit: &'a str,
    min_quantity: f64,
    price: f64,
    location: &'a str,
    last_updated: NaiveDate,
}

impl<'a> From<&'a StockItem> for ExportRow<'a> {
    fn from(item: &'a StockItem) -> Self {
        Self {
            name: &item.name,
            category: &item.category,
            quantity: item.quantity,
            unit: &item.unit,
            min_quantity: item.min_quantity,
            price: item.price,
            location: &item.location,
            last_updated: item.last_updated,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRow {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    category: String,
    quantity: f64,
    unit: String,
    #[serde(default)]
    min_quantity: f64,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    location: String,
    #[serde(default)]
    last_updated: Option<NaiveDate>,
}

impl ImportRow {
    fn into_imported(self, imported_on: NaiveDate) -> DomainResult<ImportedItem> {
        let id = self.id.map(ItemId::new);
        if let Some(id) = id.filter(|id| *id < ItemId::first()) {
            return Err(DomainError::invalid_id(format!("item id {id} is below 1")));
        }
        let imported = ImportedItem {
            id,
            record: NewItem {
                name: self.name,
                category: self.category,
                quantity: self.quantity,
                unit: self.unit,
                min_quantity: self.min_quantity,
                price: self.price,
                location: self.location,
            },
            last_updated: self.last_updated.unwrap_or(imported_on),
        };
        imported.record.validate()?;
        Ok(imported)
    }
}

/// A row left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input.
    pub line: u64,
    pub reason: String,
}

/// Rows recovered from a CSV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub items: Vec<ImportedItem>,
    pub skipped: Vec<SkippedRow>,
}

/// Write `items` as CSV into `out`, returning the writer.
pub fn write_items<W: io::Write>(out: W, items: &[StockItem]) -> Result<W, CsvError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(HEADER)?;
    for item in items {
        writer.serialize(ExportRow::from(item))?;
    }
    writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))
}

/// CSV text for `items`.
pub fn export_items(items: &[StockItem]) -> Result<String, CsvError> {
    let bytes = write_items(Vec::new(), items)?;
    Ok(String::from_utf8(bytes)?)
}

/// An empty file with just the header row.
pub fn template() -> Result<String, CsvError> {
    export_items(&[])
}

/// Parse items from CSV. Rows without `lastUpdated` are dated `imported_on`.
///
/// Fails only when the header row itself cannot be read.
pub fn parse_items<R: io::Read>(input: R, imported_on: NaiveDate) -> Result<ImportReport, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut report = ImportReport::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map_or(0, csv::Position::line);
                skip(&mut report, line, err.to_string());
                continue;
            }
        };
        let line = record.position().map_or(0, csv::Position::line);

        let row: ImportRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(err) => {
                skip(&mut report, line, err.to_string());
                continue;
            }
        };
        match row.into_imported(imported_on) {
            Ok(imported) => report.items.push(imported),
            Err(err) => skip(&mut report, line, err.to_string()),
        }
    }

    tracing::debug!(
        parsed = report.items.len(),
        skipped = report.skipped.len(),
        "parsed inventory csv"
    );
    Ok(report)
}

fn skip(report: &mut ImportReport, line: u64, reason: String) {
    tracing::warn!(line, %reason, "skipping csv row");
    report.skipped.push(SkippedRow { line, reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsepartner_inventory::seed;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn export_writes_header_and_one_row_per_item() {
        let items = seed::demo_items();
        let text = export_items(&items).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("name,category,quantity,unit,minQuantity,price,location,lastUpdated")
        );
        assert_eq!(
            lines.next(),
            Some("Safety Helmets,Personal Protective Equipment,50.0,pieces,20.0,25.0,Safety Storage,2023-08-01")
        );
        assert_eq!(text.lines().count(), items.len() + 1);
    }

    #[test]
    fn template_is_header_only() {
        assert_eq!(
            template().unwrap(),
            "name,category,quantity,unit,minQuantity,price,location,lastUpdated\n"
        );
    }

    #[test]
    fn exported_file_reimports() {
        let items = seed::demo_items();
        let text = export_items(&items).unwrap();
        let report = parse_items(text.as_bytes(), day(2024, 1, 1)).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(report.items.len(), items.len());
        assert_eq!(report.items[3].record.name, "Diesel Fuel");
        assert_eq!(report.items[3].last_updated, day(2023, 8, 18));
        assert_eq!(report.items[3].id, None);
    }

    #[test]
    fn malformed_rows_are_skipped_with_line_numbers() {
        let text = "\
name,category,quantity,unit,minQuantity,price,location,lastUpdated
Gloves,PPE,10,pairs,5,2.5,Store,2024-03-01
Broken,PPE,lots,pairs,5,2.5,Store,2024-03-01
,PPE,3,pairs,1,1,Store,2024-03-01
Masks,PPE,-4,boxes,1,1,Store,2024-03-01
Short,PPE
Goggles,PPE,7,pairs,2,4,Store,
";
        let report = parse_items(text.as_bytes(), day(2024, 5, 5)).unwrap();

        let names: Vec<_> = report.items.iter().map(|i| i.record.name.as_str()).collect();
        assert_eq!(names, ["Gloves", "Goggles"]);
        assert_eq!(report.items[1].last_updated, day(2024, 5, 5));

        let lines: Vec<_> = report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [3, 4, 5, 6]);
    }

    #[test]
    fn optional_id_column_and_reordered_headers() {
        let text = "\
id,unit,name,category,quantity
4,L,Diesel Fuel,Fuels,120
,kg,Lime,Soil,40
";
        let report = parse_items(text.as_bytes(), day(2024, 5, 5)).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.items[0].id, Some(ItemId::new(4)));
        assert_eq!(report.items[0].record.quantity, 120.0);
        assert_eq!(report.items[1].id, None);
        assert_eq!(report.items[1].record.price, 0.0);
    }

    #[test]
    fn zero_id_is_skipped() {
        let text = "\
id,name,category,quantity,unit
0,Apron,PPE,3,pieces
1,Boots,PPE,4,pairs
";
        let report = parse_items(text.as_bytes(), day(2024, 5, 5)).unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].id, Some(ItemId::new(1)));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert!(report.skipped[0].reason.contains("invalid identifier"));
    }
}
