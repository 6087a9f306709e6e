//! Tabular data: the upstream result-set shape and the season record table.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::record::columns;
use super::PlayerSeasonRecord;

/// Errors raised while reading named columns out of a table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value in column {column} at row {row}: {value}")]
    InvalidCell {
        column: String,
        row: usize,
        value: String,
    },
}

/// One named table as returned by the stats API: a header row plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, row_set: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            headers,
            row_set,
        }
    }

    /// Position of a column by exact header name.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a column that must be present.
    pub fn require(&self, column: &str) -> Result<usize, TableError> {
        self.position(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))
    }

    pub fn len(&self) -> usize {
        self.row_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_set.is_empty()
    }
}

/// Coerce a cell to a number.
///
/// Numbers pass through, numeric strings are parsed, everything else is missing.
pub fn cell_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Coerce a cell to text. Null is missing.
pub fn cell_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Resolved positions of the season columns inside a result set.
struct SeasonColumns {
    player_name: usize,
    team_abbreviation: usize,
    pts: usize,
    ast: usize,
    reb: usize,
    stl: usize,
    blk: usize,
    fg3m: usize,
    min: usize,
    plus_minus: usize,
    fga: usize,
    fg3a: usize,
    tov: usize,
}

impl SeasonColumns {
    fn resolve(set: &ResultSet) -> Result<Self, TableError> {
        Ok(Self {
            player_name: set.require(columns::PLAYER_NAME)?,
            team_abbreviation: set.require(columns::TEAM_ABBREVIATION)?,
            pts: set.require(columns::PTS)?,
            ast: set.require(columns::AST)?,
            reb: set.require(columns::REB)?,
            stl: set.require(columns::STL)?,
            blk: set.require(columns::BLK)?,
            fg3m: set.require(columns::FG3M)?,
            min: set.require(columns::MIN)?,
            plus_minus: set.require(columns::PLUS_MINUS)?,
            fga: set.require(columns::FGA)?,
            fg3a: set.require(columns::FG3A)?,
            tov: set.require(columns::TOV)?,
        })
    }
}

pub(crate) static NULL_CELL: Value = Value::Null;

/// Reads cells from one positional row, reporting the row number on failure.
struct RowReader<'a> {
    row: &'a [Value],
    row_num: usize,
}

impl RowReader<'_> {
    fn cell(&self, idx: usize) -> &Value {
        self.row.get(idx).unwrap_or(&NULL_CELL)
    }

    fn invalid(&self, column: &str, idx: usize) -> TableError {
        TableError::InvalidCell {
            column: column.to_string(),
            row: self.row_num,
            value: self.cell(idx).to_string(),
        }
    }

    fn text(&self, column: &str, idx: usize) -> Result<String, TableError> {
        cell_string(self.cell(idx)).ok_or_else(|| self.invalid(column, idx))
    }

    /// A signed number.
    fn number(&self, column: &str, idx: usize) -> Result<f64, TableError> {
        cell_f64(self.cell(idx)).ok_or_else(|| self.invalid(column, idx))
    }

    /// A counting stat; negative values are rejected.
    fn count(&self, column: &str, idx: usize) -> Result<f64, TableError> {
        let v = self.number(column, idx)?;
        if v < 0.0 {
            return Err(self.invalid(column, idx));
        }
        Ok(v)
    }
}

/// In-memory season snapshot: one row per player per team.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<PlayerSeasonRecord>,
}

impl RecordTable {
    pub fn new(records: Vec<PlayerSeasonRecord>) -> Self {
        Self { records }
    }

    /// Build the table from an upstream result set, resolving columns by name.
    ///
    /// Columns not used by the season model are ignored.
    pub fn from_result_set(set: &ResultSet) -> Result<Self, TableError> {
        let cols = SeasonColumns::resolve(set)?;
        let mut records = Vec::with_capacity(set.row_set.len());

        for (row_num, row) in set.row_set.iter().enumerate() {
            let r = RowReader { row, row_num };
            records.push(PlayerSeasonRecord {
                player_name: r.text(columns::PLAYER_NAME, cols.player_name)?,
                team_abbreviation: r.text(columns::TEAM_ABBREVIATION, cols.team_abbreviation)?,
                pts: r.count(columns::PTS, cols.pts)?,
                ast: r.count(columns::AST, cols.ast)?,
                reb: r.count(columns::REB, cols.reb)?,
                stl: r.count(columns::STL, cols.stl)?,
                blk: r.count(columns::BLK, cols.blk)?,
                fg3m: r.count(columns::FG3M, cols.fg3m)?,
                min: r.count(columns::MIN, cols.min)?,
                plus_minus: r.number(columns::PLUS_MINUS, cols.plus_minus)?,
                fga: r.count(columns::FGA, cols.fga)?,
                fg3a: r.count(columns::FG3A, cols.fg3a)?,
                tov: r.count(columns::TOV, cols.tov)?,
            });
        }

        let table = Self::new(records);
        let duplicates = table.duplicate_keys();
        if duplicates > 0 {
            warn!(
                "{} duplicate player/team rows in {}; lookups use the first match",
                duplicates, set.name
            );
        }
        Ok(table)
    }

    pub fn records(&self) -> &[PlayerSeasonRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerSeasonRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated team abbreviations.
    pub fn teams(&self) -> Vec<String> {
        sorted_unique(self.records.iter().map(|r| r.team_abbreviation.as_str()))
    }

    /// Number of rows whose player/team pair already appeared earlier.
    pub fn duplicate_keys(&self) -> usize {
        let mut seen = HashSet::new();
        self.records.iter().filter(|r| !seen.insert(r.key())).count()
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a PlayerSeasonRecord;
    type IntoIter = std::slice::Iter<'a, PlayerSeasonRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A season result set together with the records built from it.
///
/// The result set keeps every upstream column for persistence and download;
/// the records hold the modelled subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTable {
    source: ResultSet,
    records: RecordTable,
}

impl SeasonTable {
    pub fn from_result_set(source: ResultSet) -> Result<Self, TableError> {
        let records = RecordTable::from_result_set(&source)?;
        Ok(Self { source, records })
    }

    /// All upstream columns, in upstream order.
    pub fn source(&self) -> &ResultSet {
        &self.source
    }

    pub fn records(&self) -> &RecordTable {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<RecordTable> for SeasonTable {
    /// A result set holding only the modelled columns.
    fn from(records: RecordTable) -> Self {
        let headers = columns::ALL.iter().map(|c| c.to_string()).collect();
        let row_set = records
            .iter()
            .map(|r| {
                vec![
                    Value::from(r.player_name.as_str()),
                    Value::from(r.team_abbreviation.as_str()),
                    Value::from(r.pts),
                    Value::from(r.ast),
                    Value::from(r.reb),
                    Value::from(r.stl),
                    Value::from(r.blk),
                    Value::from(r.fg3m),
                    Value::from(r.min),
                    Value::from(r.plus_minus),
                    Value::from(r.fga),
                    Value::from(r.fg3a),
                    Value::from(r.tov),
                ]
            })
            .collect();

        Self {
            source: ResultSet::new("PlayerSeasonRecords", headers, row_set),
            records,
        }
    }
}

pub(crate) fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
