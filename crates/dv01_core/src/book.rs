//! In-memory position store, grouped per trader.
//!
//! Ingestion validates each [`PositionRecord`] on its own. Valid rows land in
//! the book, invalid rows come back as [`RejectedRecord`]s; one bad row never
//! discards the rest of the feed.

use crate::error::InputError;
use crate::ids::TraderId;
use crate::position::{Position, PositionRecord};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A record that failed validation, kept for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Where the record came from (e.g. a file name), if known.
    pub source: Option<String>,
    /// 1-based row number within its source.
    pub row: usize,
    /// The record as received.
    pub record: PositionRecord,
    /// Why it was rejected.
    #[serde(serialize_with = "serialize_display")]
    pub error: InputError,
}

fn numbered<I: IntoIterator<Item = PositionRecord>>(
    records: I,
) -> impl Iterator<Item = (usize, PositionRecord)> {
    records.into_iter().enumerate().map(|(i, r)| (i + 1, r))
}

fn serialize_display<S: Serializer>(error: &InputError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Positions of every trader taking part in an evaluation pass.
///
/// Traders are kept in name order so that every pass visits them
/// identically. A trader can be registered without positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionBook {
    traders: BTreeMap<TraderId, Vec<Position>>,
}

impl PositionBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from already validated positions.
    pub fn from_positions<I: IntoIterator<Item = Position>>(positions: I) -> Self {
        let mut book = Self::new();
        for position in positions {
            book.insert(position);
        }
        book
    }

    /// Builds a book from raw records, returning the rejected ones alongside.
    pub fn from_records<I: IntoIterator<Item = PositionRecord>>(
        records: I,
    ) -> (Self, Vec<RejectedRecord>) {
        let mut book = Self::new();
        let rejected = book.ingest(records);
        (book, rejected)
    }

    /// Registers a trader, with no positions if it is new.
    pub fn register_trader(&mut self, trader: impl Into<TraderId>) {
        self.traders.entry(trader.into()).or_default();
    }

    /// Adds a validated position.
    pub fn insert(&mut self, position: Position) {
        self.traders
            .entry(position.trader().clone())
            .or_default()
            .push(position);
    }

    /// Validates and adds records, returning those that failed.
    pub fn ingest<I: IntoIterator<Item = PositionRecord>>(
        &mut self,
        records: I,
    ) -> Vec<RejectedRecord> {
        self.ingest_records(None, numbered(records))
    }

    /// Same as [`PositionBook::ingest`], tagging rejects with their source.
    pub fn ingest_from<I: IntoIterator<Item = PositionRecord>>(
        &mut self,
        source: &str,
        records: I,
    ) -> Vec<RejectedRecord> {
        self.ingest_records(Some(source), numbered(records))
    }

    /// Like [`PositionBook::ingest_from`] for records that carry their own
    /// 1-based row numbers, e.g. after skipping blank rows of a file.
    pub fn ingest_rows<I: IntoIterator<Item = (usize, PositionRecord)>>(
        &mut self,
        source: &str,
        rows: I,
    ) -> Vec<RejectedRecord> {
        self.ingest_records(Some(source), rows)
    }

    fn ingest_records<I: IntoIterator<Item = (usize, PositionRecord)>>(
        &mut self,
        source: Option<&str>,
        rows: I,
    ) -> Vec<RejectedRecord> {
        let mut rejected = Vec::new();
        for (row, record) in rows {
            match record.validate() {
                Ok(position) => self.insert(position),
                Err(error) => rejected.push(RejectedRecord {
                    source: source.map(str::to_string),
                    row,
                    record,
                    error,
                }),
            }
        }
        rejected
    }

    /// Iterates over traders and their positions, in trader order.
    pub fn traders(&self) -> impl Iterator<Item = (&TraderId, &[Position])> {
        self.traders.iter().map(|(t, p)| (t, p.as_slice()))
    }

    /// Returns the positions of one trader.
    pub fn positions_for(&self, trader: &TraderId) -> Option<&[Position]> {
        self.traders.get(trader).map(Vec::as_slice)
    }

    /// Number of registered traders.
    pub fn trader_count(&self) -> usize {
        self.traders.len()
    }

    /// Total number of positions across traders.
    pub fn position_count(&self) -> usize {
        self.traders.values().map(Vec::len).sum()
    }

    /// Returns true when no trader is registered.
    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}
