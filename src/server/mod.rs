//! Local web app serving the three dashboards.
//!
//! The loaded dataset lives behind an `Arc` and is only ever read; each
//! request computes its result from scratch.

use crate::dashboard::{DashboardContext, DashboardKind, Gate, Request};
use crate::models::CategorySelector;
use crate::report::html::{self, FormOptions};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared, read-only application state.
pub struct AppState {
    pub ctx: DashboardContext,
    pub options: FormOptions,
}

impl AppState {
    pub fn new(ctx: DashboardContext) -> Self {
        let options = FormOptions::from_context(&ctx);
        Self { ctx, options }
    }
}

/// Query parameters of every dashboard route. Everything arrives as text so
/// that empty dropdowns (`?year1=`) read as "not selected" instead of failing
/// extraction.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    company: Option<String>,
    industry: Option<String>,
    category: Option<String>,
    year1: Option<String>,
    year2: Option<String>,
    submit: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl DashboardQuery {
    fn submitted(&self) -> bool {
        matches!(non_blank(&self.submit), Some(v) if v != "0")
    }

    fn category(&self) -> Result<Option<CategorySelector>, String> {
        non_blank(&self.category)
            .map(str::parse::<CategorySelector>)
            .transpose()
    }

    fn year(value: &Option<String>) -> Result<Option<i32>, String> {
        non_blank(value)
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| format!("Invalid year: {}", v))
            })
            .transpose()
    }

    /// Turn the query into a dashboard request. Fails only on values that
    /// cannot be parsed at all.
    pub fn to_request(&self, kind: DashboardKind) -> Result<Request, String> {
        Ok(match kind {
            DashboardKind::Frequency => Request::Frequency {
                company: self.company.clone(),
                category: self.category()?,
            },
            DashboardKind::Leaders => Request::Leaders {
                industry: self.industry.clone(),
            },
            DashboardKind::Heatmap => Request::Heatmap {
                year1: Self::year(&self.year1)?,
                year2: Self::year(&self.year2)?,
                category: self.category()?,
            },
        })
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/frequency", get(frequency_page))
        .route("/leaders", get(leaders_page))
        .route("/heatmap", get(heatmap_page))
        .route("/api/frequency", get(api_frequency))
        .route("/api/leaders", get(api_leaders))
        .route("/api/heatmap", get(api_heatmap))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve the dashboards until Ctrl-C.
pub async fn serve(ctx: DashboardContext, bind: &str) -> Result<()> {
    let state = Arc::new(AppState::new(ctx));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!("Serving dashboards on http://{}", addr);
    println!("🌐 Dashboards available at http://{}", addr);
    println!("   Press Ctrl-C to stop.");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("Server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(html::index_page(&state.ctx))
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "records": state.ctx.dataset.len(),
        })),
    )
}

async fn frequency_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let submitted = query.submitted();
    render_page(&state, DashboardKind::Frequency, &query, submitted)
}

/// The leaders page computes as soon as an industry is picked; on first
/// load the first industry in dataset order is preselected.
async fn leaders_page(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<DashboardQuery>,
) -> Response {
    if query.industry.is_none() {
        query.industry = state.options.default_industry.clone();
    }
    render_page(&state, DashboardKind::Leaders, &query, true)
}

/// Before the first submit the form is prefilled with the earliest year, the
/// second earliest (or the earliest again if there is only one) and the
/// environmental category.
async fn heatmap_page(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<DashboardQuery>,
) -> Response {
    let submitted = query.submitted();
    if !submitted {
        let years = &state.options.years;
        let earliest = years.first();
        let second = years.get(1).or(earliest);
        query.year1 = query.year1.or_else(|| earliest.map(|y| y.to_string()));
        query.year2 = query.year2.or_else(|| second.map(|y| y.to_string()));
        query.category = query
            .category
            .or_else(|| Some(CategorySelector::Environmental.as_str().to_string()));
    }
    render_page(&state, DashboardKind::Heatmap, &query, submitted)
}

fn render_page(
    state: &AppState,
    kind: DashboardKind,
    query: &DashboardQuery,
    submitted: bool,
) -> Response {
    let request = match query.to_request(kind) {
        Ok(request) => request,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };
    debug!("{} page: {:?} (submitted: {})", kind, request, submitted);

    let gate = Gate::submit(&request, submitted).compute(&state.ctx);
    Html(html::dashboard_page(
        &state.options,
        &request,
        &gate,
        &state.ctx.chart,
    ))
    .into_response()
}

async fn api_frequency(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    api_response(&state, DashboardKind::Frequency, &query)
}

async fn api_leaders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    api_response(&state, DashboardKind::Leaders, &query)
}

async fn api_heatmap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    api_response(&state, DashboardKind::Heatmap, &query)
}

/// API calls always count as submitted.
fn api_response(state: &AppState, kind: DashboardKind, query: &DashboardQuery) -> Response {
    let request = match query.to_request(kind) {
        Ok(request) => request,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    let gate = Gate::submit(&request, true).compute(&state.ctx);
    match gate.output() {
        Some(output) => (StatusCode::OK, Json(output)).into_response(),
        None => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": gate.prompt().unwrap_or(kind.prompt()) })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::dataset::testing::{dataset_from, fixture_aliases, fixture_dataset};
    use crate::dataset::Dataset;
    use crate::taxonomy::{Preset, Taxonomy};
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn app_with(dataset: Dataset) -> Router {
        let ctx = DashboardContext::new(
            dataset,
            &Taxonomy::builtin(Preset::Full),
            &Taxonomy::builtin(Preset::Core),
            fixture_aliases(),
            ChartConfig::default(),
        );
        build_router(Arc::new(AppState::new(ctx)))
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        get_body_from(app_with(fixture_dataset()), uri).await
    }

    async fn get_body_from(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_query_parsing() {
        let query = DashboardQuery {
            year1: Some("2020".to_string()),
            year2: Some("".to_string()),
            category: Some("top_5_social".to_string()),
            submit: Some("1".to_string()),
            ..Default::default()
        };

        assert!(query.submitted());
        assert_eq!(
            query.to_request(DashboardKind::Heatmap),
            Ok(Request::Heatmap {
                year1: Some(2020),
                year2: None,
                category: Some(CategorySelector::Social),
            })
        );
    }

    #[test]
    fn test_bad_year_is_rejected() {
        let query = DashboardQuery {
            year1: Some("twenty".to_string()),
            ..Default::default()
        };

        assert!(query.to_request(DashboardKind::Heatmap).is_err());
        assert!(!query.submitted());
    }

    #[tokio::test]
    async fn test_healthz_reports_records() {
        let (status, body) = get_body("/healthz").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["records"], 10);
    }

    #[tokio::test]
    async fn test_frequency_page_without_submit_does_not_compute() {
        let (status, body) = get_body("/frequency?company=Acme%20Energy&category=all").await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<svg"));
        assert!(!body.contains(r#"class="alert""#));
    }

    #[tokio::test]
    async fn test_frequency_page_with_submit_renders_chart() {
        let (status, body) =
            get_body("/frequency?company=Acme%20Energy&category=all&submit=1").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<svg"));
        assert!(body.contains("Acme Energy ESG Indicators"));
    }

    #[tokio::test]
    async fn test_frequency_page_prompts_on_missing_category() {
        let (_, body) = get_body("/frequency?company=Acme%20Energy&category=&submit=1").await;

        assert!(body.contains(DashboardKind::Frequency.prompt()));
    }

    #[tokio::test]
    async fn test_leaders_page_preselects_first_industry() {
        let (status, body) = get_body("/leaders").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<option value="Energy" selected>Energy</option>"#));
        assert!(body.contains("Average ESG Indicators Disclosed by Firms (Energy)"));
    }

    #[tokio::test]
    async fn test_leaders_page_preselects_industry_in_dataset_order() {
        let app = app_with(dataset_from(
            "company,industry,year,scope_1\n\
             Zed,Retail,2020,1\n\
             Ace,Energy,2020,1\n",
        ));

        let (status, body) = get_body_from(app, "/leaders").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<option value="Retail" selected>Retail</option>"#));
        assert!(body.contains("Average ESG Indicators Disclosed by Firms (Retail)"));
        assert!(!body.contains("(Energy)"));
    }

    #[tokio::test]
    async fn test_heatmap_page_prefills_second_year_independently() {
        let (_, body) = get_body("/heatmap?year1=2021").await;

        assert!(body.contains(r#"<option value="2021" selected>2021</option>"#));
        assert!(body.contains(r#"<option value="2020" selected>2020</option>"#));
        assert!(!body.contains(r#"<option value="2019" selected>2019</option>"#));
    }

    #[tokio::test]
    async fn test_heatmap_page_with_one_year_prefills_it_twice() {
        let app = app_with(dataset_from(
            "company,industry,year,scope_1\n\
             Ace,Energy,2020,1\n",
        ));

        let (status, body) = get_body_from(app, "/heatmap").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.matches(r#"<option value="2020" selected>2020</option>"#).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_heatmap_page_prefills_defaults() {
        let (_, body) = get_body("/heatmap").await;

        assert!(body.contains(r#"<option value="2019" selected>2019</option>"#));
        assert!(body.contains(r#"<option value="2020" selected>2020</option>"#));
        assert!(body.contains(r#"<option value="environmental" selected>Environmental</option>"#));
        assert!(!body.contains("<svg"));
    }

    #[tokio::test]
    async fn test_api_missing_selection_is_unprocessable() {
        let (status, body) = get_body("/api/heatmap?year1=2020&category=social").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["error"], DashboardKind::Heatmap.prompt());
    }

    #[tokio::test]
    async fn test_api_bad_category_is_bad_request() {
        let (status, _) = get_body("/api/frequency?company=Acme%20Energy&category=economic").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_leaders_returns_scores() {
        let (status, body) = get_body("/api/leaders?industry=Materials").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["dashboard"], "leaders");
        assert_eq!(value["result"]["companies"][0]["company"], "Cobalt Mining");
    }
}
