use crate::{error::ScrapeError, expand::expand};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// CSS selectors describing the practice listing and detail pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub tab_link: String,
    pub table: String,
    pub accordion: String,
    pub label: String,
    pub row: String,
    pub anchor: String,
    pub premium: String,
    pub difficulty: String,
    pub detail: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            tab_link: "div.tabs ul.tabs-list li a.tab-link".into(),
            table: "app-pattern-table".into(),
            accordion: "button.accordion".into(),
            label: "p".into(),
            row: "tr".into(),
            anchor: "td a.table-text".into(),
            premium: "td a.has-tooltip-bottom".into(),
            difficulty: "td.diff-col b".into(),
            detail: "div.elfjS".into(),
        }
    }
}

/// One accordion section of the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub label: String,
    pub row_count: usize,
}

/// Fields read from a single listing row. Every field is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFields {
    pub link: Option<String>,
    pub title: Option<String>,
    pub difficulty_label: Option<String>,
    pub has_premium_marker: bool,
}

/// Category tables and flattened rows read from one snapshot of the page.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub tables: Vec<CategoryTable>,
    pub rows: Vec<RowFields>,
}

/// Category label for every row position, in listing order.
pub fn attribute(tables: &[CategoryTable]) -> Result<Vec<String>, ScrapeError> {
    let labels = tables.iter().map(|t| t.label.as_str()).collect::<Vec<_>>();
    let counts = tables.iter().map(|t| t.row_count).collect::<Vec<_>>();
    expand(&labels[..], &counts)
}

struct Compiled {
    table: Selector,
    label: Selector,
    row: Selector,
    flat_row: Selector,
    cell: Selector,
    anchor: Selector,
    premium: Selector,
    difficulty: Selector,
}

impl Compiled {
    fn new(selectors: &Selectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            table: parse_selector(&selectors.table)?,
            label: parse_selector(&format!("{} {}", selectors.accordion, selectors.label))?,
            row: parse_selector(&selectors.row)?,
            flat_row: parse_selector(&format!("{} {}", selectors.table, selectors.row))?,
            cell: parse_selector("td")?,
            anchor: parse_selector(&selectors.anchor)?,
            premium: parse_selector(&selectors.premium)?,
            difficulty: parse_selector(&selectors.difficulty)?,
        })
    }

    fn is_data_row(&self, row: &ElementRef) -> bool {
        row.select(&self.cell).next().is_some()
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(s).map_err(|_| ScrapeError::Selector(s.to_string()))
}

/// Parse an expanded listing page.
///
/// Tables are counted per section and rows are read by a single
/// document-order query, both from the same markup.
pub fn parse_listing(
    html: &str,
    base: Option<&Url>,
    selectors: &Selectors,
) -> Result<Listing, ScrapeError> {
    let compiled = Compiled::new(selectors)?;
    let document = Html::parse_document(html);

    let tables = document
        .select(&compiled.table)
        .map(|table| CategoryTable {
            label: table
                .select(&compiled.label)
                .next()
                .map(|p| element_text(&p))
                .unwrap_or_default(),
            row_count: table
                .select(&compiled.row)
                .filter(|row| compiled.is_data_row(row))
                .count(),
        })
        .collect::<Vec<_>>();

    let rows = document
        .select(&compiled.flat_row)
        .filter(|row| compiled.is_data_row(row))
        .map(|row| read_row(&row, &compiled, base))
        .collect::<Vec<_>>();

    Ok(Listing { tables, rows })
}

/// Extract the fields of one row using the given selectors.
pub fn extract_row(
    row: ElementRef,
    selectors: &Selectors,
    base: Option<&Url>,
) -> Result<RowFields, ScrapeError> {
    let compiled = Compiled::new(selectors)?;
    Ok(read_row(&row, &compiled, base))
}

fn read_row(row: &ElementRef, compiled: &Compiled, base: Option<&Url>) -> RowFields {
    let anchor = row.select(&compiled.anchor).next();
    RowFields {
        link: anchor
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_link(href, base)),
        title: anchor.map(|a| element_text(&a)),
        difficulty_label: row
            .select(&compiled.difficulty)
            .next()
            .map(|b| element_text(&b)),
        has_premium_marker: row.select(&compiled.premium).next().is_some(),
    }
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn resolve_link(href: &str, base: Option<&Url>) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}
