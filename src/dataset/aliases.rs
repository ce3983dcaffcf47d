//! Indicator alias table.
//!
//! Maps human-readable aliases (`Alias` column) to canonical indicator names
//! (`indicator` column). Used only for chart labels.

use super::DataError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Case-insensitive alias lookup.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    /// lower-cased alias -> canonical indicator
    by_alias: HashMap<String, String>,
    /// lower-cased indicator -> first alias listed for it, as written
    labels: HashMap<String, String>,
    /// aliases as written, in the order first seen
    written: Vec<String>,
}

impl AliasTable {
    /// A table with no aliases; every indicator is labelled by its own name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load an alias table from a CSV file.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_reader(file)
    }

    /// Parse an alias table from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let alias_idx =
            position("alias").ok_or_else(|| DataError::MissingColumn("Alias".to_string()))?;
        let indicator_idx = position("indicator")
            .ok_or_else(|| DataError::MissingColumn("indicator".to_string()))?;

        let mut table = Self::default();
        for row in csv_reader.records() {
            let row = row?;
            let alias = row.get(alias_idx).unwrap_or("");
            let indicator = row.get(indicator_idx).unwrap_or("");
            if alias.is_empty() || indicator.is_empty() {
                continue;
            }
            table.insert(alias, indicator);
        }

        debug!("Loaded {} indicator aliases", table.len());
        Ok(table)
    }

    /// Register an alias. A repeated alias keeps its latest indicator, and
    /// the indicator it used to point at is relabelled.
    pub fn insert(&mut self, alias: &str, indicator: &str) {
        let previous = self
            .by_alias
            .insert(alias.to_lowercase(), indicator.to_string());
        match previous {
            None => self.written.push(alias.to_string()),
            Some(old) if old.to_lowercase() != indicator.to_lowercase() => self.relabel(&old),
            Some(_) => {}
        }
        self.labels
            .entry(indicator.to_lowercase())
            .or_insert_with(|| alias.to_string());
    }

    /// Point an indicator's label at the first alias still mapped to it.
    fn relabel(&mut self, indicator: &str) {
        let key = indicator.to_lowercase();
        let first = self
            .written
            .iter()
            .find(|alias| {
                self.by_alias
                    .get(&alias.to_lowercase())
                    .is_some_and(|target| target.to_lowercase() == key)
            })
            .cloned();

        match first {
            Some(alias) => {
                self.labels.insert(key, alias);
            }
            None => {
                self.labels.remove(&key);
            }
        }
    }

    /// Canonical indicator for an alias, ignoring case.
    pub fn indicator_for(&self, alias: &str) -> Option<&str> {
        self.by_alias
            .get(&alias.trim().to_lowercase())
            .map(|s| s.as_str())
    }

    /// Display label for an indicator: its alias, or the name itself.
    pub fn display_label(&self, indicator: &str) -> String {
        self.labels
            .get(&indicator.to_lowercase())
            .cloned()
            .unwrap_or_else(|| indicator.to_string())
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    /// True when the table holds no aliases.
    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::testing::fixture_aliases;

    #[test]
    fn test_alias_lookup_ignores_case() {
        let aliases = fixture_aliases();

        assert_eq!(aliases.indicator_for("GHG Emissions"), Some("total_ghg_emissions"));
        assert_eq!(aliases.indicator_for("ghg emissions"), Some("total_ghg_emissions"));
        assert_eq!(
            aliases.indicator_for("GHG Emissions"),
            aliases.indicator_for("gHg EMISSIONS")
        );
        assert_eq!(aliases.indicator_for("Carbon"), None);
    }

    #[test]
    fn test_many_aliases_to_one_indicator() {
        let aliases = fixture_aliases();

        assert_eq!(aliases.indicator_for("Scope 1 Emissions"), Some("scope_1"));
        assert_eq!(aliases.indicator_for("Direct Emissions"), Some("scope_1"));
        // First alias listed wins the label.
        assert_eq!(aliases.display_label("scope_1"), "Scope 1 Emissions");
    }

    #[test]
    fn test_display_label_falls_back_to_name() {
        let aliases = fixture_aliases();

        assert_eq!(aliases.display_label("SCOPE_2"), "Scope 2 Emissions");
        assert_eq!(aliases.display_label("scope_3"), "scope_3");
        assert_eq!(AliasTable::empty().display_label("scope_1"), "scope_1");
    }

    #[test]
    fn test_missing_alias_column() {
        let err = AliasTable::from_reader("name,indicator\nx,scope_1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "Alias"));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let table =
            AliasTable::from_reader("Alias,indicator\n,scope_1\nHeadcount,\nStaff,number_of_employees\n".as_bytes())
                .unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_remapped_alias_drops_stale_label() {
        let mut aliases = AliasTable::empty();
        aliases.insert("Water", "emissions_to_water_by_pollutant");
        aliases.insert("Water", "total_water_consumption");

        assert_eq!(aliases.indicator_for("water"), Some("total_water_consumption"));
        assert_eq!(aliases.display_label("total_water_consumption"), "Water");
        assert_eq!(
            aliases.display_label("emissions_to_water_by_pollutant"),
            "emissions_to_water_by_pollutant"
        );
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_remapped_alias_falls_back_to_next_alias() {
        let mut aliases = AliasTable::empty();
        aliases.insert("Water", "emissions_to_water_by_pollutant");
        aliases.insert("Effluents", "emissions_to_water_by_pollutant");
        aliases.insert("WATER", "total_water_consumption");

        assert_eq!(
            aliases.display_label("emissions_to_water_by_pollutant"),
            "Effluents"
        );
        assert_eq!(aliases.display_label("total_water_consumption"), "WATER");
    }
}
