//! The disclosure table.
//!
//! One record per (company, industry, year) report, with one nullable value
//! per indicator column. Only columns that name a taxonomy indicator are
//! parsed; every other column is ignored.

use super::DataError;
use crate::taxonomy::Taxonomy;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Cell contents treated as "not disclosed".
const NULL_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "<na>"];

/// One disclosure report.
#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureRecord {
    pub company: String,
    pub industry: Option<String>,
    pub year: i32,
    /// Values aligned with [`Dataset::columns`].
    values: Vec<Option<f64>>,
}

impl DisclosureRecord {
    /// Value of the indicator at a column position.
    pub fn value(&self, column: usize) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }
}

/// The loaded disclosure table.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<DisclosureRecord>,
}

impl Dataset {
    /// Load a dataset from a CSV file.
    pub fn load(path: &Path, taxonomy: &Taxonomy) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_reader(file, &path.display().to_string(), taxonomy)
    }

    /// Parse a dataset from any CSV reader.
    ///
    /// `source` is only used for labelling exports.
    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        taxonomy: &Taxonomy,
    ) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let company_idx = position("company")
            .or_else(|| position("company_name"))
            .ok_or_else(|| DataError::MissingColumn("company".to_string()))?;
        let year_idx =
            position("year").ok_or_else(|| DataError::MissingColumn("year".to_string()))?;
        let industry_idx = position("industry");

        // (position in the CSV row, indicator name); first occurrence wins.
        let mut seen = HashSet::new();
        let indicator_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| taxonomy.contains(name) && seen.insert(name.to_string()))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let ignored = headers
            .len()
            .saturating_sub(indicator_cols.len() + 2 + industry_idx.map_or(0, |_| 1));
        debug!(
            "Dataset {} has {} indicator columns ({} other columns ignored)",
            source,
            indicator_cols.len(),
            ignored
        );

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            let year = parse_year(cell(year_idx)).ok_or_else(|| DataError::InvalidYear {
                line,
                value: cell(year_idx).to_string(),
            })?;

            let industry = industry_idx
                .map(cell)
                .filter(|s| !is_null(s))
                .map(str::to_string);

            let values = indicator_cols
                .iter()
                .map(|(idx, name)| {
                    parse_value(cell(*idx)).map_err(|value| DataError::InvalidValue {
                        line,
                        column: name.clone(),
                        value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            records.push(DisclosureRecord {
                company: cell(company_idx).to_string(),
                industry,
                year,
                values,
            });
        }

        let columns: Vec<String> = indicator_cols.into_iter().map(|(_, name)| name).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        info!("Loaded {} records from {}", records.len(), source);

        Ok(Self {
            source: source.to_string(),
            columns,
            index,
            records,
        })
    }

    /// Where the dataset was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Indicator columns present in the file, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of an indicator column.
    pub fn column_index(&self, indicator: &str) -> Option<usize> {
        self.index.get(indicator).copied()
    }

    /// Positions of the given indicators, skipping any not in the file.
    pub fn column_indices(&self, indicators: &[String]) -> Vec<usize> {
        indicators
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect()
    }

    /// All records, in file order.
    pub fn records(&self) -> &[DisclosureRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct companies, in order of first appearance.
    pub fn companies(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.company.as_str()))
    }

    /// Distinct industries, in order of first appearance.
    pub fn industries(&self) -> Vec<String> {
        unique_in_order(self.records.iter().filter_map(|r| r.industry.as_deref()))
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell.to_lowercase().as_str())
}

/// Parse a year cell; `2021` and `2021.0` are both accepted.
fn parse_year(cell: &str) -> Option<i32> {
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// Parse an indicator cell. The error carries the offending text.
fn parse_value(cell: &str) -> Result<Option<f64>, String> {
    if is_null(cell) {
        return Ok(None);
    }

    match cell.to_lowercase().as_str() {
        "true" => return Ok(Some(1.0)),
        "false" => return Ok(Some(0.0)),
        _ => {}
    }

    match cell.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(cell.to_string()),
    }
}
