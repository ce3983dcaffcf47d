//! Data models for the ESG dashboards.
//!
//! This module contains the core data structures shared by the aggregation
//! engine, the renderers and the web app: indicator categories, category
//! selectors and the per-dashboard aggregation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ESG category an indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Environmental indicators (emissions, energy, water, waste)
    Environmental,
    /// Social indicators (workforce, human rights, accidents)
    Social,
    /// Governance indicators (corruption, whistleblowing, payments)
    Governance,
}

impl Category {
    /// All categories in stacking order.
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    /// Single-letter tag used in chart legends.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Environmental => "E",
            Category::Social => "S",
            Category::Governance => "G",
        }
    }

    /// Fill colour of the category's bar segment.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Environmental => "mediumseagreen",
            Category::Social => "dodgerblue",
            Category::Governance => "orange",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Environmental => write!(f, "Environmental"),
            Category::Social => write!(f, "Social"),
            Category::Governance => write!(f, "Governance"),
        }
    }
}

/// Which indicators a dashboard request covers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CategorySelector {
    /// Every indicator in the taxonomy
    #[default]
    #[value(alias = "top_5")]
    All,
    /// Environmental indicators only
    #[value(aliases = ["e", "top_5_environmental"])]
    Environmental,
    /// Social indicators only
    #[value(aliases = ["s", "top_5_social"])]
    Social,
    /// Governance indicators only
    #[value(aliases = ["g", "top_5_governance"])]
    Governance,
}

impl CategorySelector {
    /// Every selector, in dropdown order.
    pub const ALL: [CategorySelector; 4] = [
        CategorySelector::All,
        CategorySelector::Environmental,
        CategorySelector::Social,
        CategorySelector::Governance,
    ];

    /// The single category this selector narrows to, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            CategorySelector::All => None,
            CategorySelector::Environmental => Some(Category::Environmental),
            CategorySelector::Social => Some(Category::Social),
            CategorySelector::Governance => Some(Category::Governance),
        }
    }

    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategorySelector::All => "all",
            CategorySelector::Environmental => "environmental",
            CategorySelector::Social => "social",
            CategorySelector::Governance => "governance",
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(category) => write!(f, "{}", category),
            None => write!(f, "All"),
        }
    }
}

impl FromStr for CategorySelector {
    type Err = String;

    /// Accepts the plain names as well as the `top_5*` values of the
    /// indicator-type dropdown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "top_5" => Ok(CategorySelector::All),
            "environmental" | "e" | "top_5_environmental" => Ok(CategorySelector::Environmental),
            "social" | "s" | "top_5_social" => Ok(CategorySelector::Social),
            "governance" | "g" | "top_5_governance" => Ok(CategorySelector::Governance),
            other => Err(format!("Unknown indicator category: {}", other)),
        }
    }
}

/// Sum of one indicator's values for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTotal {
    /// Canonical indicator name (dataset column).
    pub indicator: String,
    /// Sum of the non-null values.
    pub total: f64,
}

/// One point of an indicator time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    /// Raw value; `None` when the indicator was not disclosed that year.
    pub value: Option<f64>,
}

/// Time series of a single indicator for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// Canonical indicator name.
    pub indicator: String,
    /// Legend label (alias, plus category tag when showing all categories).
    pub label: String,
    /// Category of the indicator, if it is part of the taxonomy.
    pub category: Option<Category>,
    /// Total used for ranking.
    pub total: f64,
    /// Points ordered by ascending year.
    pub points: Vec<SeriesPoint>,
}

/// Result of the indicator-frequency dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyChart {
    pub company: String,
    pub selector: CategorySelector,
    /// Top indicators, highest total first.
    pub series: Vec<IndicatorSeries>,
}

impl FrequencyChart {
    /// Chart title.
    pub fn title(&self) -> String {
        format!("{} ESG Indicators", self.company)
    }

    /// Every year that appears in any series, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.year))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Average disclosure counts of one company within an industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyScore {
    pub company: String,
    /// Rounded mean of disclosed environmental indicators per report.
    #[serde(rename = "E")]
    pub environmental: u32,
    /// Rounded mean of disclosed social indicators per report.
    #[serde(rename = "S")]
    pub social: u32,
    /// Rounded mean of disclosed governance indicators per report.
    #[serde(rename = "G")]
    pub governance: u32,
    /// Number of distinct years the company reported.
    pub years_reported: usize,
    /// E + S + G after rounding.
    #[serde(rename = "Total")]
    pub total: u32,
}

impl CompanyScore {
    /// Score of a single category.
    pub fn score(&self, category: Category) -> u32 {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }
}

/// Result of the industry-leaders dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderBoard {
    pub industry: String,
    /// Minimum distinct years a company needed to be listed.
    pub min_years_reported: usize,
    /// Companies ranked by (Total, E, years_reported), best first.
    pub companies: Vec<CompanyScore>,
}

impl LeaderBoard {
    /// Chart title.
    pub fn title(&self) -> String {
        format!(
            "Average ESG Indicators Disclosed by Firms ({})",
            self.industry
        )
    }
}

/// Industry × indicator matrix of prevalence rates (or their differences).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrevalenceMatrix {
    /// Year the rates were computed for; `None` for a difference matrix.
    pub year: Option<i32>,
    /// Indicator names, one per heatmap row.
    pub indicators: Vec<String>,
    /// Industry names, one per heatmap column, sorted by name.
    pub industries: Vec<String>,
    /// `values[industry][indicator]`.
    pub values: Vec<Vec<f64>>,
}

impl PrevalenceMatrix {
    /// Value for an industry/indicator pair, by position.
    pub fn get(&self, industry: usize, indicator: usize) -> f64 {
        self.values
            .get(industry)
            .and_then(|row| row.get(indicator))
            .copied()
            .unwrap_or(0.0)
    }

    /// Row of values for an industry, by name.
    pub fn row(&self, industry: &str) -> Option<&[f64]> {
        self.industries
            .iter()
            .position(|i| i == industry)
            .and_then(|idx| self.values.get(idx))
            .map(|row| row.as_slice())
    }

    /// True when the matrix has no cells.
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty() || self.indicators.is_empty()
    }
}

/// Result of the heatmap-comparison dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapComparison {
    pub selector: CategorySelector,
    pub year1: i32,
    pub year2: i32,
    pub first: PrevalenceMatrix,
    pub second: PrevalenceMatrix,
    /// `second - first`, aligned over the union of industries.
    pub difference: PrevalenceMatrix,
}

impl HeatmapComparison {
    /// Title of a single-year heatmap.
    pub fn year_title(&self, year: i32) -> String {
        format!(
            "Year {} - {} ESG Indicators by Industry",
            year, self.selector
        )
    }

    /// Title of the difference heatmap.
    pub fn difference_title(&self) -> String {
        format!("Difference in {} ESG Indicators by Industry", self.selector)
    }
}

/// Metadata attached to exported results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Dashboard that produced the result.
    pub dashboard: String,
    /// Time the export was generated.
    pub generated_at: DateTime<Utc>,
    /// Dataset the result was computed from.
    pub dataset: String,
    /// Version of the tool.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_str() {
        assert_eq!("top_5".parse::<CategorySelector>(), Ok(CategorySelector::All));
        assert_eq!(
            "Environmental".parse::<CategorySelector>(),
            Ok(CategorySelector::Environmental)
        );
        assert_eq!(
            "top_5_governance".parse::<CategorySelector>(),
            Ok(CategorySelector::Governance)
        );
        assert!("economic".parse::<CategorySelector>().is_err());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(CategorySelector::All.to_string(), "All");
        assert_eq!(CategorySelector::Social.to_string(), "Social");
        assert_eq!(CategorySelector::Social.as_str(), "social");
    }

    #[test]
    fn test_frequency_years_are_sorted_and_unique() {
        let chart = FrequencyChart {
            company: "Acme".to_string(),
            selector: CategorySelector::All,
            series: vec![
                IndicatorSeries {
                    indicator: "scope_1".to_string(),
                    label: "scope_1 (E)".to_string(),
                    category: Some(Category::Environmental),
                    total: 3.0,
                    points: vec![
                        SeriesPoint { year: 2021, value: Some(1.0) },
                        SeriesPoint { year: 2019, value: Some(2.0) },
                    ],
                },
                IndicatorSeries {
                    indicator: "scope_2".to_string(),
                    label: "scope_2 (E)".to_string(),
                    category: Some(Category::Environmental),
                    total: 1.0,
                    points: vec![SeriesPoint { year: 2021, value: None }],
                },
            ],
        };

        assert_eq!(chart.years(), vec![2019, 2021]);
        assert_eq!(chart.title(), "Acme ESG Indicators");
    }

    #[test]
    fn test_company_score_serializes_with_column_names() {
        let score = CompanyScore {
            company: "Acme".to_string(),
            environmental: 5,
            social: 3,
            governance: 2,
            years_reported: 4,
            total: 10,
        };

        let json = serde_json::to_string(&score).unwrap();
        assert!(json.contains("\"E\":5"));
        assert!(json.contains("\"Total\":10"));
        assert_eq!(score.score(Category::Social), 3);
    }

    #[test]
    fn test_matrix_row_lookup() {
        let matrix = PrevalenceMatrix {
            year: Some(2020),
            indicators: vec!["scope_1".to_string()],
            industries: vec!["Energy".to_string(), "Retail".to_string()],
            values: vec![vec![0.5], vec![1.0]],
        };

        assert_eq!(matrix.row("Retail"), Some(&[1.0][..]));
        assert_eq!(matrix.row("Banking"), None);
        assert_eq!(matrix.get(0, 0), 0.5);
        assert_eq!(matrix.get(5, 0), 0.0);
    }
}
