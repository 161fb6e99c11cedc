// Page parser capability: raw page content in, typed rows out
pub mod vcha_parser;

pub use vcha_parser::{DetailSchema, ListingSchema, VchaParser};

use crate::model::ParserError;

/// One row of the restaurant listing table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRow {
    pub name: String,
    pub facility_type: String,
    pub community: String,
    pub address: String,
    pub phone: String,
    /// Link to the detail page as it appears on the page (usually relative).
    pub detail_link: String,
}

/// One row of a detail page's inspection table. Counts stay textual;
/// coercion happens when they are applied to a restaurant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionRow {
    pub date: String,
    pub number: String,
    pub reason: String,
    pub critical: String,
    pub noncritical: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailPage {
    pub outstanding_noncritical: Option<String>,
    pub outstanding_critical: Option<String>,
    pub inspections: Vec<InspectionRow>,
}

pub trait PageParser: Send + Sync {
    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>, ParserError>;
    fn parse_detail(&self, html: &str) -> Result<DetailPage, ParserError>;
}
