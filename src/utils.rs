// Utility functions
use chrono::NaiveDate;

/// Date format used on the inspection pages, e.g. `07-Mar-2019`.
pub const INSPECTION_DATE_FORMAT: &str = "%d-%b-%Y";

/// Collapses line breaks into ", " so multi-line addresses share one cache key.
pub fn normalize_address(address: &str) -> String {
    address
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses an inspection date in the fixed `DD-Mon-YYYY` format.
pub fn parse_inspection_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), INSPECTION_DATE_FORMAT)
}

/// Stable restaurant id: the last path segment of its detail link.
pub fn id_from_detail_link(link: &str) -> String {
    let path = link.split(['?', '#']).next().unwrap_or("");
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Pulls the quoted target out of `location.href='...'` style onclick handlers.
pub fn link_from_onclick(onclick: &str) -> Option<&str> {
    onclick.split('\'').nth(1).filter(|link| !link.is_empty())
}
