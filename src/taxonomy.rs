//! ESG indicator taxonomy.
//!
//! A fixed partition of indicator names into Environmental, Social and
//! Governance lists. Two built-in presets exist: the full lists used by the
//! indicator frequency dashboard and the shorter core lists scored by the
//! leaders and heatmap dashboards. Either can be replaced per category from
//! the `[taxonomy]` section of `.esgdash.toml`.

use crate::config::TaxonomyConfig;
use crate::dataset::AliasTable;
use crate::models::{Category, CategorySelector};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const ENVIRONMENTAL: &[&str] = &[
    "climate_change_mitigation",
    "decarbonisation",
    "financial_resources_allocated_for_esg",
    "achieved_ghg_emission_reductions",
    "expected_ghg_emission_reductions",
    "total_energy_consumption",
    "total_energy_consumption_from_fossil_sources",
    "total_energy_consumption_from_nuclear_sources",
    "renewable_energy_production",
    "total_energy_consumption_from_renewable_sources",
    "scope_1",
    "scope_2",
    "scope_3",
    "total_ghg_emissions",
    "emissions_to_air_by_pollutant",
    "emissions_to_water_by_pollutant",
    "emissions_to_soil_by_pollutant",
    "total_amount_of_substances_of_concern_hazard_class",
    "total_water_consumption",
    "total_water_recycled_and_reused",
    "policy_related_to_water_and_marine_resources",
    "total_waste_generated",
    "total_amount_of_hazardous_waste",
    "total_amount_of_radioactive_waste",
];

const SOCIAL: &[&str] = &[
    "human_rights_policy_commitments_for_employees",
    "workplace_accident_prevention_policy",
    "elimination_of_discrimination",
    "grievance_or_complaints_handling",
    "mitigate_negative_impacts_on_own_workforce",
    "delivering_positive_impacts_for_own_workforce",
    "number_of_employees",
    "number_of_board_members",
    "percentage_of_employees_at_top_management_level",
    "number_of_employees_under_30",
    "percentage_of_employees_under_30",
    "number_of_employees_between_30_and_50",
    "percentage_of_employees_between_30_and_50",
    "number_of_employees_over_50",
    "percentage_of_employees_over_50",
    "number_of_fatalities_in_own_workforce",
    "number_of_work_related_accidents",
    "number_of_work_related_ill_health",
    "number_incidents_of_discrimination",
    "number_of_complaints_filed",
    "number_of_severe_human_rights_issues",
    "amount_of_fines_for_severe_human_rights_issues",
    "human_rights_policy_commitments_for_customers_and_end_users",
];

const GOVERNANCE: &[&str] = &[
    "whistleblowing_protection",
    "policy_for_animal_welfare",
    "training_within_organisation_on_business_conduct",
    "disclosure_on_corruption_and_bribery",
    "violation_of_anti_corruption_and_anti_bribery_laws",
    "fines_paid_for_violation_of_anti_corruption_and_anti_bribery_laws",
    "financial_political_contributions",
    "legal_proceedings_for_late_payments",
    "information_regarding_payment_practices",
];

const CORE_ENVIRONMENTAL: &[&str] = &[
    "climate_change_mitigation",
    "decarbonisation",
    "financial_resources_allocated_for_esg",
    "achieved_ghg_emission_reductions",
    "expected_ghg_emission_reductions",
    "total_energy_consumption",
    "total_energy_consumption_from_fossil_sources",
    "total_energy_consumption_from_nuclear_sources",
    "renewable_energy_production",
    "total_energy_consumption_from_renewable_sources",
    "scope_1",
    "scope_2",
    "scope_3",
    "total_ghg_emissions",
    "emissions_to_air_by_pollutant",
    "total_water_consumption",
    "policy_related_to_water_and_marine_resources",
    "total_waste_generated",
    "total_amount_of_hazardous_waste",
];

const CORE_SOCIAL: &[&str] = &[
    "human_rights_policy_commitments_for_employees",
    "workplace_accident_prevention_policy",
    "elimination_of_discrimination",
    "grievance_or_complaints_handling",
    "mitigate_negative_impacts_on_own_workforce",
    "delivering_positive_impacts_for_own_workforce",
    "number_of_employees",
    "number_of_board_members",
    "percentage_of_employees_at_top_management_level",
    "number_of_work_related_ill_health",
    "number_of_severe_human_rights_issues",
    "human_rights_policy_commitments_for_customers_and_end_users",
];

const CORE_GOVERNANCE: &[&str] = &[
    "whistleblowing_protection",
    "training_within_organisation_on_business_conduct",
    "disclosure_on_corruption_and_bribery",
    "violation_of_anti_corruption_and_anti_bribery_laws",
    "fines_paid_for_violation_of_anti_corruption_and_anti_bribery_laws",
    "legal_proceedings_for_late_payments",
];

/// Built-in indicator lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 24/23/9 lists, ranked by the frequency dashboard.
    Full,
    /// 19/12/6 subset, scored by the leaders and heatmap dashboards.
    Core,
}

impl Preset {
    fn lists(&self) -> [&'static [&'static str]; 3] {
        match self {
            Preset::Full => [ENVIRONMENTAL, SOCIAL, GOVERNANCE],
            Preset::Core => [CORE_ENVIRONMENTAL, CORE_SOCIAL, CORE_GOVERNANCE],
        }
    }
}

/// Errors raised while building a taxonomy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("indicator `{indicator}` is listed as both {first} and {second}")]
    Overlap {
        indicator: String,
        first: Category,
        second: Category,
    },
}

/// Disjoint E/S/G indicator lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    environmental: Vec<String>,
    social: Vec<String>,
    governance: Vec<String>,
    lookup: HashMap<String, Category>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin(Preset::Full)
    }
}

impl Taxonomy {
    /// One of the built-in presets.
    pub fn builtin(preset: Preset) -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        let [environmental, social, governance] = preset.lists();
        // The built-in lists are disjoint.
        Self::from_lists(owned(environmental), owned(social), owned(governance))
    }

    /// Build a taxonomy, rejecting an indicator listed under two categories.
    ///
    /// Duplicates inside one list are dropped, keeping the first occurrence.
    pub fn new(
        environmental: Vec<String>,
        social: Vec<String>,
        governance: Vec<String>,
    ) -> Result<Self, TaxonomyError> {
        let mut seen: HashMap<&str, Category> = HashMap::new();
        for (category, list) in [
            (Category::Environmental, &environmental),
            (Category::Social, &social),
            (Category::Governance, &governance),
        ] {
            for name in list {
                match seen.get(name.as_str()) {
                    Some(&first) if first != category => {
                        return Err(TaxonomyError::Overlap {
                            indicator: name.clone(),
                            first,
                            second: category,
                        });
                    }
                    _ => {
                        seen.insert(name.as_str(), category);
                    }
                }
            }
        }

        Ok(Self::from_lists(environmental, social, governance))
    }

    /// A preset with any per-category overrides from the config applied.
    /// An overridden category is the same in every preset.
    ///
    /// Override entries may use an alias instead of the column name.
    pub fn from_config(
        config: &TaxonomyConfig,
        aliases: &AliasTable,
        preset: Preset,
    ) -> Result<Self, TaxonomyError> {
        let builtin = Self::builtin(preset);
        let resolve = |names: &Option<Vec<String>>, fallback: Vec<String>| -> Vec<String> {
            match names {
                Some(names) => names
                    .iter()
                    .map(|name| {
                        aliases
                            .indicator_for(name)
                            .map(str::to_string)
                            .unwrap_or_else(|| name.trim().to_string())
                    })
                    .collect(),
                None => fallback,
            }
        };

        Self::new(
            resolve(&config.environmental, builtin.environmental),
            resolve(&config.social, builtin.social),
            resolve(&config.governance, builtin.governance),
        )
    }

    fn from_lists(
        environmental: Vec<String>,
        social: Vec<String>,
        governance: Vec<String>,
    ) -> Self {
        let dedup = |list: Vec<String>| {
            let mut seen = HashSet::new();
            list.into_iter()
                .filter(|name| seen.insert(name.clone()))
                .collect::<Vec<_>>()
        };
        let environmental = dedup(environmental);
        let social = dedup(social);
        let governance = dedup(governance);

        let mut lookup = HashMap::new();
        for (category, list) in [
            (Category::Environmental, &environmental),
            (Category::Social, &social),
            (Category::Governance, &governance),
        ] {
            for name in list {
                lookup.entry(name.clone()).or_insert(category);
            }
        }

        Self {
            environmental,
            social,
            governance,
            lookup,
        }
    }

    /// Indicator names of one category, in list order.
    pub fn list(&self, category: Category) -> &[String] {
        match category {
            Category::Environmental => &self.environmental,
            Category::Social => &self.social,
            Category::Governance => &self.governance,
        }
    }

    /// Indicator names covered by a selector (E, then S, then G for `all`).
    pub fn indicators(&self, selector: CategorySelector) -> Vec<String> {
        match selector.category() {
            Some(category) => self.list(category).to_vec(),
            None => Category::ALL
                .iter()
                .flat_map(|c| self.list(*c).iter().cloned())
                .collect(),
        }
    }

    /// Category of an indicator, or `None` if it is not part of the taxonomy.
    pub fn category_of(&self, indicator: &str) -> Option<Category> {
        self.lookup.get(indicator).copied()
    }

    /// Whether the indicator is part of the taxonomy.
    pub fn contains(&self, indicator: &str) -> bool {
        self.lookup.contains_key(indicator)
    }

    /// Number of indicators across all categories.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Keep only indicators that are present in `columns`, preserving order.
    pub fn restrict_to(&self, columns: &[String]) -> Taxonomy {
        let present: HashSet<&str> = columns.iter().map(|c| c.as_str()).collect();
        let keep = |list: &[String]| {
            list.iter()
                .filter(|name| present.contains(name.as_str()))
                .cloned()
                .collect::<Vec<_>>()
        };

        Self::from_lists(
            keep(&self.environmental),
            keep(&self.social),
            keep(&self.governance),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_lists_are_disjoint() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.list(Category::Environmental).len(), 24);
        assert_eq!(taxonomy.list(Category::Social).len(), 23);
        assert_eq!(taxonomy.list(Category::Governance).len(), 9);
        assert_eq!(taxonomy.len(), 24 + 23 + 9);
    }

    #[test]
    fn test_core_preset_is_subset_of_full() {
        let full = Taxonomy::builtin(Preset::Full);
        let core = Taxonomy::builtin(Preset::Core);
        assert_eq!(core.list(Category::Environmental).len(), 19);
        assert_eq!(core.list(Category::Social).len(), 12);
        assert_eq!(core.list(Category::Governance).len(), 6);

        for category in Category::ALL {
            for name in core.list(category) {
                assert_eq!(full.category_of(name), Some(category), "{}", name);
            }
        }
        assert!(!core.contains("emissions_to_water_by_pollutant"));
        assert!(!core.contains("number_of_employees_under_30"));
        assert!(!core.contains("policy_for_animal_welfare"));
    }

    #[test]
    fn test_category_of() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.category_of("scope_1"), Some(Category::Environmental));
        assert_eq!(taxonomy.category_of("number_of_employees"), Some(Category::Social));
        assert_eq!(
            taxonomy.category_of("whistleblowing_protection"),
            Some(Category::Governance)
        );
        assert_eq!(taxonomy.category_of("company"), None);
    }

    #[test]
    fn test_overlap_is_rejected() {
        let err = Taxonomy::new(
            names(&["scope_1", "scope_2"]),
            names(&["scope_2"]),
            vec![],
        )
        .unwrap_err();

        assert_eq!(
            err,
            TaxonomyError::Overlap {
                indicator: "scope_2".to_string(),
                first: Category::Environmental,
                second: Category::Social,
            }
        );
    }

    #[test]
    fn test_restrict_to_is_subset_of_columns() {
        let taxonomy = Taxonomy::default();
        let columns = names(&["whistleblowing_protection", "scope_2", "not_an_indicator", "scope_1"]);
        let restricted = taxonomy.restrict_to(&columns);

        let all = restricted.indicators(CategorySelector::All);
        assert!(all.iter().all(|name| columns.contains(name)));
        // Taxonomy order, not column order.
        assert_eq!(all, names(&["scope_1", "scope_2", "whistleblowing_protection"]));
        assert!(restricted.list(Category::Social).is_empty());
    }

    #[test]
    fn test_indicators_for_single_category() {
        let taxonomy = Taxonomy::new(
            names(&["scope_1"]),
            names(&["number_of_employees"]),
            names(&["whistleblowing_protection"]),
        )
        .unwrap();

        assert_eq!(
            taxonomy.indicators(CategorySelector::Social),
            names(&["number_of_employees"])
        );
        assert_eq!(taxonomy.indicators(CategorySelector::All).len(), 3);
    }

    #[test]
    fn test_from_config_overrides_one_category() {
        let config = TaxonomyConfig {
            environmental: None,
            social: None,
            governance: Some(names(&["whistleblowing_protection"])),
        };
        let taxonomy = Taxonomy::from_config(&config, &AliasTable::empty(), Preset::Full).unwrap();
        assert_eq!(taxonomy.list(Category::Governance).len(), 1);
        assert_eq!(taxonomy.list(Category::Environmental).len(), 24);

        let core = Taxonomy::from_config(&config, &AliasTable::empty(), Preset::Core).unwrap();
        assert_eq!(core.list(Category::Governance), taxonomy.list(Category::Governance));
        assert_eq!(core.list(Category::Environmental).len(), 19);
    }

    #[test]
    fn test_from_config_resolves_aliases() {
        let mut aliases = AliasTable::empty();
        aliases.insert("Whistleblower Protection", "whistleblowing_protection");
        let config = TaxonomyConfig {
            environmental: None,
            social: None,
            governance: Some(names(&["whistleblower protection", "board_diversity"])),
        };

        let taxonomy = Taxonomy::from_config(&config, &aliases, Preset::Full).unwrap();

        assert_eq!(
            taxonomy.list(Category::Governance),
            &names(&["whistleblowing_protection", "board_diversity"])[..]
        );
    }
}
