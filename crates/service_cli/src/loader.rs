//! CSV position feed loading.
//!
//! Accepts two layouts:
//! - a firm feed with a `trader` column, one row per position
//! - a trader sheet without one; the trader is the file stem and is
//!   registered even when the sheet has no rows
//!
//! Header names are matched loosely: case, surrounding spaces and a
//! trailing unit such as `(AUD)` are ignored, spaces become underscores.
//! Optional `margin_used` and `capital` columns carry firm financials;
//! the first non-blank value of each is used.

use csv::{ReaderBuilder, StringRecord, Trim};
use dv01_core::financials::parse_amount;
use dv01_core::{FirmFinancials, InputError, PositionBook, PositionRecord, RejectedRecord};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{CliError, Result};

/// Everything read from the position files.
#[derive(Clone, Debug, Default)]
pub struct LoadedFeed {
    /// Valid positions, grouped per trader.
    pub book: PositionBook,
    /// Rows that failed validation.
    pub rejected: Vec<RejectedRecord>,
    /// Margin and capital found in the files.
    pub financials: FirmFinancials,
}

#[derive(Clone, Copy, Debug, Default)]
struct Columns {
    trader: Option<usize>,
    tenor: Option<usize>,
    contracts: Option<usize>,
    margin_used: Option<usize>,
    capital: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        for (index, header) in headers.iter().enumerate() {
            let slot = match normalize_header(header).as_str() {
                "trader" => &mut columns.trader,
                "tenor" => &mut columns.tenor,
                "contracts" => &mut columns.contracts,
                "margin_used" | "margin" => &mut columns.margin_used,
                "capital" => &mut columns.capital,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        columns
    }
}

/// Lowercases, drops a trailing `(unit)` and joins words with underscores.
fn normalize_header(header: &str) -> String {
    let header = match header.find('(') {
        Some(open) => &header[..open],
        None => header,
    };
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

fn cell(row: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Accumulates one or more CSV sources into a [`LoadedFeed`].
#[derive(Debug, Default)]
pub struct FeedLoader {
    book: PositionBook,
    rejected: Vec<RejectedRecord>,
    margins: Vec<Option<f64>>,
    capitals: Vec<Option<f64>>,
}

impl FeedLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a CSV file. The file stem names the trader of a sheet without
    /// a `trader` column.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let source = path.display().to_string();
        let sheet_trader = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.clone());
        let file = std::fs::File::open(path)?;
        self.load_reader(&source, &sheet_trader, file)
    }

    /// Loads CSV data from any reader.
    pub fn load_reader<R: Read>(
        &mut self,
        source: &str,
        sheet_trader: &str,
        reader: R,
    ) -> Result<()> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = StringRecord::from_byte_record_lossy(reader.byte_headers()?.clone());
        let columns = Columns::from_headers(&headers);

        if columns.trader.is_none() {
            debug!(source, trader = sheet_trader, "No trader column, reading as trader sheet");
            self.book.register_trader(sheet_trader);
        }

        let mut rows = Vec::new();
        let mut rejected = Vec::new();
        for (index, byte_row) in reader.byte_records().enumerate() {
            let row_number = index + 1;
            let (row, decoded) = match StringRecord::from_byte_record(byte_row?) {
                Ok(row) => (row, true),
                Err(err) => (StringRecord::from_byte_record_lossy(err.into_byte_record()), false),
            };
            if decoded {
                self.observe_financials(source, row_number, &row, &columns)?;
            }

            let trader = match columns.trader {
                Some(_) => cell(&row, columns.trader),
                None => Some(sheet_trader),
            };
            let tenor = cell(&row, columns.tenor);
            let contracts = cell(&row, columns.contracts);
            let position_cells_blank = tenor.is_none()
                && contracts.is_none()
                && (columns.trader.is_none() || trader.is_none());
            if decoded && position_cells_blank {
                continue;
            }

            let record = PositionRecord {
                trader: trader.map(str::to_string),
                tenor: tenor.map(str::to_string),
                contracts: contracts.map(str::to_string),
            };
            if decoded {
                rows.push((row_number, record));
            } else {
                let text = row.iter().collect::<Vec<_>>().join(",");
                rejected.push(RejectedRecord {
                    source: Some(source.to_string()),
                    row: row_number,
                    record,
                    error: InputError::InvalidEncoding(text),
                });
            }
        }

        let candidates = rows.len();
        let invalid = self.book.ingest_rows(source, rows);
        let accepted = candidates - invalid.len();
        rejected.extend(invalid);
        rejected.sort_by_key(|record| record.row);
        if !rejected.is_empty() {
            warn!(source, rejected = rejected.len(), "Rejected invalid position rows");
        }
        debug!(source, accepted, "Loaded position file");
        self.rejected.extend(rejected);
        Ok(())
    }

    fn observe_financials(
        &mut self,
        source: &str,
        row_number: usize,
        row: &StringRecord,
        columns: &Columns,
    ) -> Result<()> {
        let located = |error| CliError::Input {
            source_name: format!("{} row {}", source, row_number),
            error,
        };
        if let Some(raw) = cell(row, columns.margin_used) {
            self.margins
                .push(parse_amount("margin_used", raw).map_err(located)?);
        }
        if let Some(raw) = cell(row, columns.capital) {
            self.capitals
                .push(parse_amount("capital", raw).map_err(located)?);
        }
        Ok(())
    }

    /// Finishes loading, resolving the firm financials.
    pub fn finish(self) -> Result<LoadedFeed> {
        let financials = FirmFinancials::from_first_observed(self.margins, self.capitals)
            .map_err(|error| CliError::Input {
                source_name: "position files".to_string(),
                error,
            })?;
        Ok(LoadedFeed {
            book: self.book,
            rejected: self.rejected,
            financials,
        })
    }
}

/// Loads every path in order.
pub fn load_feed(paths: &[PathBuf]) -> Result<LoadedFeed> {
    let mut loader = FeedLoader::new();
    for path in paths {
        loader.load_path(path)?;
    }
    loader.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(source: &str, sheet: &str, content: &str) -> LoadedFeed {
        let mut loader = FeedLoader::new();
        loader
            .load_reader(source, sheet, content.as_bytes())
            .unwrap();
        loader.finish().unwrap()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Margin Used (AUD)"), "margin_used");
        assert_eq!(normalize_header(" Tenor "), "tenor");
        assert_eq!(normalize_header("DV01 (AUD/bp)"), "dv01");
        assert_eq!(normalize_header("contracts"), "contracts");
    }

    #[test]
    fn test_firm_feed_with_trader_column() {
        let feed = load(
            "feed.csv",
            "feed",
            "trader,tenor,contracts\nA,2Y,100\nA,10Y,-40\nB,5Y,12\n",
        );
        assert_eq!(feed.book.trader_count(), 2);
        assert_eq!(feed.book.position_count(), 3);
        assert!(feed.rejected.is_empty());
        assert_eq!(feed.financials, FirmFinancials::unknown());
    }

    #[test]
    fn test_trader_sheet_uses_sheet_name() {
        let feed = load(
            "desk_a.csv",
            "desk_a",
            "Tenor,Contracts,Margin Used (AUD),Capital (AUD)\n\
             2Y,100,100000,\n\
             10Y,-40,,2000000\n",
        );
        let positions = feed.book.positions_for(&"desk_a".into()).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(feed.financials.margin_used(), Some(100_000.0));
        assert_eq!(feed.financials.capital(), Some(2_000_000.0));
    }

    #[test]
    fn test_empty_sheet_registers_trader() {
        let feed = load("idle.csv", "idle", "Tenor,Contracts\n");
        assert_eq!(feed.book.trader_count(), 1);
        assert_eq!(feed.book.position_count(), 0);
    }

    #[test]
    fn test_invalid_rows_are_rejected_not_fatal() {
        let feed = load(
            "feed.csv",
            "feed",
            "trader,tenor,contracts\nA,2Y,100\nA,5Y,abc\n,10Y,1\nA,10Y,-40\n",
        );
        assert_eq!(feed.book.position_count(), 2);
        assert_eq!(feed.rejected.len(), 2);
        assert_eq!(feed.rejected[0].row, 2);
        assert_eq!(feed.rejected[0].source.as_deref(), Some("feed.csv"));
        assert_eq!(
            feed.rejected[0].error,
            InputError::NonNumericContracts("abc".to_string())
        );
        assert_eq!(feed.rejected[1].error, InputError::MissingField("trader"));
    }

    #[test]
    fn test_undecodable_row_is_rejected_not_fatal() {
        let mut loader = FeedLoader::new();
        loader
            .load_reader(
                "feed.csv",
                "feed",
                &b"trader,tenor,contracts\nA,2Y,100\nRen\xe9,5Y,10\nA,10Y,-40\n"[..],
            )
            .unwrap();
        let feed = loader.finish().unwrap();

        assert_eq!(feed.book.position_count(), 2);
        assert_eq!(feed.rejected.len(), 1);
        assert_eq!(feed.rejected[0].row, 2);
        assert!(matches!(
            feed.rejected[0].error,
            InputError::InvalidEncoding(_)
        ));
        assert_eq!(feed.rejected[0].record.tenor.as_deref(), Some("5Y"));
    }

    #[test]
    fn test_rejects_are_reported_in_row_order() {
        let feed = load(
            "feed.csv",
            "feed",
            "trader,tenor,contracts\nA,2Y,x\n,,\nA,5Y,1.5\n",
        );
        let rows: Vec<usize> = feed.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_financial_only_rows_are_not_positions() {
        let feed = load(
            "feed.csv",
            "feed",
            "trader,tenor,contracts,margin_used\n,,,250000\nA,2Y,1,\n",
        );
        assert_eq!(feed.book.position_count(), 1);
        assert!(feed.rejected.is_empty());
        assert_eq!(feed.financials.margin_used(), Some(250_000.0));
    }

    #[test]
    fn test_corrupt_financial_cell_is_fatal() {
        let mut loader = FeedLoader::new();
        let result = loader.load_reader(
            "feed.csv",
            "feed",
            "tenor,contracts,capital\n2Y,1,lots\n".as_bytes(),
        );
        assert!(matches!(result, Err(CliError::Input { .. })));
    }

    #[test]
    fn test_first_financial_value_wins_across_files() {
        let mut loader = FeedLoader::new();
        loader
            .load_reader("a.csv", "a", "tenor,contracts,margin_used\n2Y,1,100\n".as_bytes())
            .unwrap();
        loader
            .load_reader("b.csv", "b", "tenor,contracts,margin_used\n2Y,1,999\n".as_bytes())
            .unwrap();
        let feed = loader.finish().unwrap();
        assert_eq!(feed.financials.margin_used(), Some(100.0));
        assert_eq!(feed.book.trader_count(), 2);
    }

    #[test]
    fn test_load_path_names_trader_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates_desk.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Tenor,Contracts\n2Y,100\n10Y,-40").unwrap();

        let feed = load_feed(&[path]).unwrap();
        assert_eq!(
            feed.book.positions_for(&"rates_desk".into()).map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_load_path_missing_file() {
        let result = load_feed(&[Path::new("/nonexistent/positions.csv").to_path_buf()]);
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }
}
