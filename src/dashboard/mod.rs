//! Dashboard requests and the submit gate.
//!
//! A dashboard only computes after an explicit submit with a complete
//! selection. The gate makes that explicit:
//!
//! ```text
//! Idle --submit(complete)--> Ready --compute--> Computed
//! Idle --submit(incomplete)--> Idle (with prompt)
//! ```

use crate::analysis;
use crate::config::ChartConfig;
use crate::dataset::{AliasTable, Dataset};
use crate::models::{CategorySelector, FrequencyChart, HeatmapComparison, LeaderBoard};
use crate::taxonomy::Taxonomy;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// The three dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    /// Top indicators of one company over time (line chart)
    Frequency,
    /// Average indicators disclosed per company in an industry (stacked bars)
    Leaders,
    /// Indicator prevalence by industry for two years (heatmaps)
    Heatmap,
}

impl DashboardKind {
    /// Message shown when a required selection is missing.
    pub fn prompt(&self) -> &'static str {
        match self {
            DashboardKind::Frequency => {
                "Please select both a company and an indicator type, then click submit."
            }
            DashboardKind::Leaders => "Please select an industry.",
            DashboardKind::Heatmap => {
                "Please select two years and an ESG category, then click submit."
            }
        }
    }

    /// Page heading.
    pub fn heading(&self) -> &'static str {
        match self {
            DashboardKind::Frequency => "ESG Indicator-Specific Sentence Analysis Dashboard",
            DashboardKind::Leaders => "ESG Indicators Dashboard",
            DashboardKind::Heatmap => "ESG Heatmap Dashboard",
        }
    }

    /// URL path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            DashboardKind::Frequency => "frequency",
            DashboardKind::Leaders => "leaders",
            DashboardKind::Heatmap => "heatmap",
        }
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Raw, possibly incomplete, dropdown values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Frequency {
        company: Option<String>,
        category: Option<CategorySelector>,
    },
    Leaders {
        industry: Option<String>,
    },
    Heatmap {
        year1: Option<i32>,
        year2: Option<i32>,
        category: Option<CategorySelector>,
    },
}

impl Request {
    /// Which dashboard the request is for.
    pub fn kind(&self) -> DashboardKind {
        match self {
            Request::Frequency { .. } => DashboardKind::Frequency,
            Request::Leaders { .. } => DashboardKind::Leaders,
            Request::Heatmap { .. } => DashboardKind::Heatmap,
        }
    }

    /// The complete selection, or `None` if a required value is missing.
    /// Blank strings count as missing.
    pub fn selection(&self) -> Option<Selection> {
        let present = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match self {
            Request::Frequency { company, category } => Some(Selection::Frequency {
                company: present(company)?,
                selector: (*category)?,
            }),
            Request::Leaders { industry } => Some(Selection::Leaders {
                industry: present(industry)?,
            }),
            Request::Heatmap {
                year1,
                year2,
                category,
            } => Some(Selection::Heatmap {
                year1: (*year1)?,
                year2: (*year2)?,
                selector: (*category)?,
            }),
        }
    }
}

/// A complete set of dropdown values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Frequency {
        company: String,
        selector: CategorySelector,
    },
    Leaders {
        industry: String,
    },
    Heatmap {
        year1: i32,
        year2: i32,
        selector: CategorySelector,
    },
}

/// Aggregation result of one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dashboard", content = "result", rename_all = "lowercase")]
pub enum DashboardOutput {
    Frequency(FrequencyChart),
    Leaders(LeaderBoard),
    Heatmap(HeatmapComparison),
}

impl DashboardOutput {
    /// Which dashboard produced the output.
    pub fn kind(&self) -> DashboardKind {
        match self {
            DashboardOutput::Frequency(_) => DashboardKind::Frequency,
            DashboardOutput::Leaders(_) => DashboardKind::Leaders,
            DashboardOutput::Heatmap(_) => DashboardKind::Heatmap,
        }
    }
}

/// Submit gate state.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Nothing to compute. `prompt` is set when a submit arrived with a
    /// missing selection.
    Idle { prompt: Option<&'static str> },
    /// Submitted with a complete selection, not yet computed.
    Ready(Selection),
    /// Aggregation done.
    Computed(DashboardOutput),
}

impl Gate {
    /// Apply a submit (or its absence) to a request.
    pub fn submit(request: &Request, submitted: bool) -> Gate {
        if !submitted {
            return Gate::Idle { prompt: None };
        }

        match request.selection() {
            Some(selection) => Gate::Ready(selection),
            None => Gate::Idle {
                prompt: Some(request.kind().prompt()),
            },
        }
    }

    /// Run the aggregation if the gate is ready; other states are returned
    /// unchanged.
    pub fn compute(self, ctx: &DashboardContext) -> Gate {
        match self {
            Gate::Ready(selection) => Gate::Computed(ctx.run(&selection)),
            other => other,
        }
    }

    /// Prompt to show, if any.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Gate::Idle { prompt } => *prompt,
            _ => None,
        }
    }

    /// Computed output, if any.
    pub fn output(&self) -> Option<&DashboardOutput> {
        match self {
            Gate::Computed(output) => Some(output),
            _ => None,
        }
    }
}

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub dataset: Dataset,
    /// Full taxonomy restricted to the dataset's columns.
    pub taxonomy: Taxonomy,
    /// Core taxonomy restricted to the dataset's columns.
    pub core_taxonomy: Taxonomy,
    pub aliases: AliasTable,
    pub chart: ChartConfig,
}

impl DashboardContext {
    /// Build a context, restricting both taxonomies to the dataset's columns.
    pub fn new(
        dataset: Dataset,
        taxonomy: &Taxonomy,
        core_taxonomy: &Taxonomy,
        aliases: AliasTable,
        chart: ChartConfig,
    ) -> Self {
        let taxonomy = taxonomy.restrict_to(dataset.columns());
        let core_taxonomy = core_taxonomy.restrict_to(dataset.columns());
        Self {
            dataset,
            taxonomy,
            core_taxonomy,
            aliases,
            chart,
        }
    }

    /// Indicator lists a dashboard works with: the full lists for the
    /// frequency dashboard, the core lists for the other two.
    pub fn taxonomy_for(&self, kind: DashboardKind) -> &Taxonomy {
        match kind {
            DashboardKind::Frequency => &self.taxonomy,
            DashboardKind::Leaders | DashboardKind::Heatmap => &self.core_taxonomy,
        }
    }

    /// Run the aggregation for a complete selection.
    pub fn run(&self, selection: &Selection) -> DashboardOutput {
        match selection {
            Selection::Frequency { company, selector } => {
                info!("Computing top indicators for {} ({})", company, selector.as_str());
                DashboardOutput::Frequency(analysis::frequency_chart(
                    &self.dataset,
                    self.taxonomy_for(DashboardKind::Frequency),
                    &self.aliases,
                    company,
                    *selector,
                    self.chart.top_n,
                ))
            }
            Selection::Leaders { industry } => {
                info!("Computing category scores for {}", industry);
                DashboardOutput::Leaders(analysis::category_scores(
                    &self.dataset,
                    self.taxonomy_for(DashboardKind::Leaders),
                    industry,
                    self.chart.min_years_reported,
                ))
            }
            Selection::Heatmap {
                year1,
                year2,
                selector,
            } => {
                info!(
                    "Computing {} heatmaps for {} vs {}",
                    selector.as_str(),
                    year1,
                    year2
                );
                DashboardOutput::Heatmap(analysis::compare_years(
                    &self.dataset,
                    self.taxonomy_for(DashboardKind::Heatmap),
                    *selector,
                    *year1,
                    *year2,
                ))
            }
        }
    }
}
