//! Aggregation engine.
//!
//! One module per dashboard. Every routine reads the loaded dataset and
//! returns a freshly built result; nothing here mutates shared state.

pub mod frequency;
pub mod leaders;
pub mod prevalence;

pub use frequency::frequency_chart;
pub use leaders::category_scores;
pub use prevalence::compare_years;
