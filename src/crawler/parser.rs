//! HTML parsing for listing and detail pages
//!
//! This module handles:
//! - Extracting the ordered item links from a listing page
//! - The [`RecordParser`] contract that turns a detail page into a [`Record`]
//! - [`ProjectPageParser`], the parser for the catalog's project pages

use crate::output::Record;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors produced while extracting a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("required field '{field}' not found")]
    MissingField { field: &'static str },

    #[error("invalid selector '{0}'")]
    InvalidSelector(&'static str),
}

/// Turns one raw detail page into a record
///
/// Implementations either produce a complete record or fail; partial records
/// are never returned. Every string field must come back trimmed.
pub trait RecordParser: Send + Sync {
    fn parse(&self, raw_page: &str, source_url: &str) -> Result<Record, ParseError>;
}

/// Extracts the `data-link` of every listing row, in page order
///
/// # Example
///
/// ```
/// use catalog_harvester::crawler::extract_item_links;
///
/// let html = r#"<table>
///     <tr data-link="detail/a"><td>A</td></tr>
///     <tr><td>header</td></tr>
///     <tr data-link="detail/b"><td>B</td></tr>
/// </table>"#;
/// assert_eq!(extract_item_links(html), vec!["detail/a", "detail/b"]);
/// ```
pub fn extract_item_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(row_selector) = Selector::parse("tr[data-link]") else {
        return Vec::new();
    };

    document
        .select(&row_selector)
        .filter_map(|row| row.value().attr("data-link"))
        .map(str::to_string)
        .collect()
}

const OVERVIEW_HEADING: &str = "项目概述";
const PROGRESS_HEADING: &str = "项目进展";
const TEAM_HEADING: &str = "团队信息";
const PATENT_HEADING: &str = "专利情况";

/// Parser for project detail pages
///
/// | Field | Source |
/// |-------|--------|
/// | title | first `h4` |
/// | province, city | first and second `span` in `div.location` |
/// | industry | first `span` in `div.industry` |
/// | overview, progress, team, patent | first `p` after the matching `h5` heading |
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectPageParser;

impl RecordParser for ProjectPageParser {
    fn parse(&self, raw_page: &str, source_url: &str) -> Result<Record, ParseError> {
        let document = Html::parse_document(raw_page);

        let title = first_text(&document, "h4", "title")?;

        let locations = texts(&document, "div.location span")?;
        let province = locations
            .first()
            .cloned()
            .ok_or(ParseError::MissingField { field: "province" })?;
        let city = locations
            .get(1)
            .cloned()
            .ok_or(ParseError::MissingField { field: "city" })?;

        let industry = first_text(&document, "div.industry span", "industry")?;

        let record = Record {
            title,
            province,
            city,
            industry,
            overview: section_text(&document, OVERVIEW_HEADING, "overview")?,
            progress: section_text(&document, PROGRESS_HEADING, "progress")?,
            team: section_text(&document, TEAM_HEADING, "team")?,
            patent: section_text(&document, PATENT_HEADING, "patent")?,
            source_url: source_url.to_string(),
        };

        Ok(record.trimmed())
    }
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::InvalidSelector(css))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn texts(document: &Html, css: &'static str) -> Result<Vec<String>, ParseError> {
    let selector = selector(css)?;
    Ok(document.select(&selector).map(element_text).collect())
}

fn first_text(
    document: &Html,
    css: &'static str,
    field: &'static str,
) -> Result<String, ParseError> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .ok_or(ParseError::MissingField { field })
}

/// Text of the first `p` that follows, in document order, an `h5` containing `heading`
fn section_text(
    document: &Html,
    heading: &str,
    field: &'static str,
) -> Result<String, ParseError> {
    let mut in_section = false;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        match element.value().name() {
            "h5" if !in_section && element_text(element).contains(heading) => {
                in_section = true;
            }
            "p" if in_section => return Ok(element_text(element)),
            _ => {}
        }
    }

    Err(ParseError::MissingField { field })
}
