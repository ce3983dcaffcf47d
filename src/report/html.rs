//! HTML dashboard pages.
//!
//! Pages are self-contained: inline CSS, charts embedded as inline SVG, no
//! scripts beyond the leaders dropdown's auto-submit.

use super::{escape, svg};
use crate::config::ChartConfig;
use crate::dashboard::{DashboardContext, DashboardKind, DashboardOutput, Gate, Request};
use crate::models::{CategorySelector, ExportMetadata, LeaderBoard};

/// Dropdown choices, taken from the loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
    pub companies: Vec<String>,
    pub industries: Vec<String>,
    /// First industry in dataset order, preselected on the leaders page.
    pub default_industry: Option<String>,
    pub years: Vec<i32>,
    pub top_n: usize,
}

impl FormOptions {
    pub fn from_context(ctx: &DashboardContext) -> Self {
        let mut companies = ctx.dataset.companies();
        companies.sort();
        let mut industries = ctx.dataset.industries();
        let default_industry = industries.first().cloned();
        industries.sort();

        Self {
            companies,
            industries,
            default_industry,
            years: ctx.dataset.years(),
            top_n: ctx.chart.top_n,
        }
    }
}

/// Landing page linking the three dashboards.
pub fn index_page(ctx: &DashboardContext) -> String {
    let cards: String = [
        DashboardKind::Frequency,
        DashboardKind::Leaders,
        DashboardKind::Heatmap,
    ]
    .iter()
    .map(|kind| {
        format!(
            r#"<a class="card" href="/{slug}"><h3>{heading}</h3><p>{blurb}</p></a>"#,
            slug = kind.slug(),
            heading = kind.heading(),
            blurb = match kind {
                DashboardKind::Frequency => "Top indicators of one company over time.",
                DashboardKind::Leaders => "Average indicators disclosed per firm in an industry.",
                DashboardKind::Heatmap => "Indicator prevalence by industry across two years.",
            }
        )
    })
    .collect();

    let body = format!(
        r#"<header><h1>ESG Dashboards</h1><p class="meta">{source}: {records} reports, {companies} companies, {industries} industries, {indicators} indicators</p></header>
<div class="cards">{cards}</div>"#,
        source = escape(ctx.dataset.source()),
        records = ctx.dataset.len(),
        companies = ctx.dataset.companies().len(),
        industries = ctx.dataset.industries().len(),
        indicators = ctx.taxonomy.len(),
        cards = cards,
    );

    layout("ESG Dashboards", &body)
}

/// A dashboard page: form, optional prompt and, once computed, the result.
pub fn dashboard_page(
    options: &FormOptions,
    request: &Request,
    gate: &Gate,
    chart: &ChartConfig,
) -> String {
    let kind = request.kind();
    let alert = gate
        .prompt()
        .map(|p| format!(r#"<div class="alert">{}</div>"#, escape(p)))
        .unwrap_or_default();
    let result = gate
        .output()
        .map(|output| render_output(output, chart))
        .unwrap_or_default();

    let body = format!(
        r#"<nav><a href="/">&larr; All dashboards</a></nav>
<header><h1>{heading}</h1></header>
{form}
{alert}
<div class="result">{result}</div>"#,
        heading = kind.heading(),
        form = render_form(options, request),
        alert = alert,
        result = result,
    );

    layout(kind.heading(), &body)
}

/// Self-contained page for a single result, as written by the CLI.
pub fn standalone_page(output: &DashboardOutput, chart: &ChartConfig, meta: &ExportMetadata) -> String {
    let body = format!(
        r#"<header><h1>{heading}</h1><p class="meta">Dataset: {dataset} &middot; Generated {date} &middot; esgdash v{version}</p></header>
<div class="result">{result}</div>"#,
        heading = output.kind().heading(),
        dataset = escape(&meta.dataset),
        date = meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        version = escape(&meta.version),
        result = render_output(output, chart),
    );

    layout(output.kind().heading(), &body)
}

/// Leaders table, best company first.
pub fn leaders_table(board: &LeaderBoard) -> String {
    if board.companies.is_empty() {
        return format!(
            r#"<p class="empty">No firms in {} reported in at least {} years.</p>"#,
            escape(&board.industry),
            board.min_years_reported
        );
    }

    let rows: String = board
        .companies
        .iter()
        .map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&c.company),
                c.environmental,
                c.social,
                c.governance,
                c.years_reported,
                c.total
            )
        })
        .collect();

    format!(
        r#"<table class="leaders">
<thead><tr><th>Company</th><th>E</th><th>S</th><th>G</th><th>Years Reported</th><th>Total</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#,
        rows = rows
    )
}

fn render_output(output: &DashboardOutput, chart: &ChartConfig) -> String {
    let figure = format!(r#"<div class="chart">{}</div>"#, svg::dashboard_svg(output, chart));
    match output {
        DashboardOutput::Leaders(board) => format!(
            r#"{}
<div class="section">{}</div>"#,
            figure,
            leaders_table(board)
        ),
        _ => figure,
    }
}

fn render_form(options: &FormOptions, request: &Request) -> String {
    match request {
        Request::Frequency { company, category } => {
            let companies = select(
                "company",
                "Select a company",
                options.companies.iter().map(|c| (c.clone(), c.clone())),
                company.as_deref(),
                false,
            );
            let categories = select(
                "category",
                "Select indicator type",
                CategorySelector::ALL.iter().map(|s| {
                    let label = match s.category() {
                        Some(category) => format!("Top {} {} Indicators", options.top_n, category),
                        None => format!("Top {} ESG Indicators", options.top_n),
                    };
                    (s.as_str().to_string(), label)
                }),
                category.map(|c| c.as_str()),
                false,
            );
            form(&format!("{}{}", companies, categories), DashboardKind::Frequency, true)
        }
        Request::Leaders { industry } => {
            let industries = select(
                "industry",
                "Select an industry",
                options.industries.iter().map(|i| (i.clone(), i.clone())),
                industry.as_deref(),
                true,
            );
            form(&industries, DashboardKind::Leaders, false)
        }
        Request::Heatmap {
            year1,
            year2,
            category,
        } => {
            let year_options = |name: &str, placeholder: &str, selected: Option<i32>| {
                let selected = selected.map(|y| y.to_string());
                select(
                    name,
                    placeholder,
                    options.years.iter().map(|y| (y.to_string(), y.to_string())),
                    selected.as_deref(),
                    false,
                )
            };
            let categories = select(
                "category",
                "Select ESG category",
                CategorySelector::ALL
                    .iter()
                    .map(|s| (s.as_str().to_string(), s.to_string())),
                category.map(|c| c.as_str()),
                false,
            );
            form(
                &format!(
                    "{}{}{}",
                    year_options("year1", "Select first year", *year1),
                    year_options("year2", "Select second year", *year2),
                    categories
                ),
                DashboardKind::Heatmap,
                true,
            )
        }
    }
}

fn form(fields: &str, kind: DashboardKind, with_submit: bool) -> String {
    let button = if with_submit {
        r#"<button type="submit" name="submit" value="1">Submit</button>"#
    } else {
        ""
    };
    format!(
        r#"<form method="get" action="/{slug}">{fields}{button}</form>"#,
        slug = kind.slug(),
        fields = fields,
        button = button
    )
}

fn select<I>(
    name: &str,
    placeholder: &str,
    choices: I,
    selected: Option<&str>,
    auto_submit: bool,
) -> String
where
    I: Iterator<Item = (String, String)>,
{
    let mut html = format!(
        r#"<select name="{}"{}><option value="">{}</option>"#,
        name,
        if auto_submit {
            r#" onchange="this.form.submit()""#
        } else {
            ""
        },
        escape(placeholder)
    );
    for (value, label) in choices {
        let mark = if selected == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape(&value),
            mark,
            escape(&label)
        ));
    }
    html.push_str("</select>");
    html
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>
"#,
        title = escape(title),
        css = inline_css(),
        body = body,
    )
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; }
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #111827;
    background: #ffffff;
    margin: 0;
}
.container { max-width: 1600px; margin: 0 auto; padding: 2rem; }
header { margin-bottom: 1.5rem; border-bottom: 2px solid #e5e7eb; }
header h1 { font-size: 1.75rem; margin: 0.5rem 0; }
.meta { color: #6b7280; font-size: 0.875rem; }
nav a, .card { color: #1d4ed8; text-decoration: none; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); gap: 1rem; }
.card { display: block; padding: 1rem; background: #f9fafb; border-left: 4px solid #3b82f6; border-radius: 0.5rem; }
.card p { color: #374151; }
form { display: flex; gap: 0.75rem; flex-wrap: wrap; margin-bottom: 1rem; }
select, button { padding: 0.4rem 0.6rem; font-size: 0.95rem; }
button { background: #2563eb; color: white; border: none; border-radius: 0.25rem; cursor: pointer; }
.alert { padding: 0.75rem 1rem; background: #fef3c7; border-left: 4px solid #f59e0b; margin-bottom: 1rem; }
.chart { overflow-x: auto; margin-bottom: 1.5rem; }
.empty { color: #6b7280; }
table { border-collapse: collapse; min-width: 50%; }
th, td { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e5e7eb; text-align: left; font-size: 0.875rem; }
thead { background: #f9fafb; }
"#
}
