// HTML parsing for the health authority's FoodPremises pages
use crate::model::ParserError;
use crate::parser::{DetailPage, InspectionRow, ListingRow, PageParser};
use crate::utils::link_from_onclick;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub const OUTSTANDING_NONCRITICAL_LABEL: &str = "Outstanding Non-Critical Infractions";
pub const OUTSTANDING_CRITICAL_LABEL: &str = "Outstanding Critical Infractions";

/// Selectors for the listing table.
#[derive(Debug, Clone)]
pub struct ListingSchema {
    pub row: String,
    pub name: String,
    pub facility_type: String,
    pub community: String,
    pub address: String,
    pub phone: String,
    /// Row attribute holding the `location.href='...'` handler.
    pub link_attr: String,
}

impl Default for ListingSchema {
    fn default() -> Self {
        Self {
            row: "tr.hovereffect".into(),
            name: ".facilityName".into(),
            facility_type: ".facilityType".into(),
            community: ".community".into(),
            address: ".siteAddress".into(),
            phone: ".phoneNumber".into(),
            link_attr: "onclick".into(),
        }
    }
}

/// Selectors for a detail page: labelled summary rows plus the inspection table.
#[derive(Debug, Clone)]
pub struct DetailSchema {
    pub summary_row: String,
    pub label: String,
    pub field: String,
    pub inspection_row: String,
    pub date: String,
    pub number: String,
    pub reason: String,
    pub critical: String,
    pub noncritical: String,
}

impl Default for DetailSchema {
    fn default() -> Self {
        Self {
            summary_row: "tr.nozebrastripes".into(),
            label: ".display-label".into(),
            field: ".display-field".into(),
            inspection_row: "tr.hovereffect".into(),
            date: ".inspectionDate".into(),
            number: ".inspectionNumber".into(),
            reason: ".inspectionType".into(),
            critical: ".criticalInfractionsCount".into(),
            noncritical: ".nonCriticalInfractionsCount".into(),
        }
    }
}

struct ListingSelectors {
    row: Selector,
    name: Selector,
    facility_type: Selector,
    community: Selector,
    address: Selector,
    phone: Selector,
    link_attr: String,
}

struct DetailSelectors {
    summary_row: Selector,
    label: Selector,
    field: Selector,
    inspection_row: Selector,
    date: Selector,
    number: Selector,
    reason: Selector,
    critical: Selector,
    noncritical: Selector,
}

pub struct VchaParser {
    listing: ListingSelectors,
    detail: DetailSelectors,
}

fn compile(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::HtmlParseError(format!("{}: {}", css, e)))
}

/// Trimmed text of the first match, or an empty string.
fn text_of(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

impl VchaParser {
    pub fn new() -> Result<Self, ParserError> {
        Self::with_schemas(&ListingSchema::default(), &DetailSchema::default())
    }

    pub fn with_schemas(listing: &ListingSchema, detail: &DetailSchema) -> Result<Self, ParserError> {
        Ok(Self {
            listing: ListingSelectors {
                row: compile(&listing.row)?,
                name: compile(&listing.name)?,
                facility_type: compile(&listing.facility_type)?,
                community: compile(&listing.community)?,
                address: compile(&listing.address)?,
                phone: compile(&listing.phone)?,
                link_attr: listing.link_attr.clone(),
            },
            detail: DetailSelectors {
                summary_row: compile(&detail.summary_row)?,
                label: compile(&detail.label)?,
                field: compile(&detail.field)?,
                inspection_row: compile(&detail.inspection_row)?,
                date: compile(&detail.date)?,
                number: compile(&detail.number)?,
                reason: compile(&detail.reason)?,
                critical: compile(&detail.critical)?,
                noncritical: compile(&detail.noncritical)?,
            },
        })
    }
}

impl PageParser for VchaParser {
    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>, ParserError> {
        let document = Html::parse_document(html);
        let s = &self.listing;

        let mut rows = Vec::new();
        for element in document.select(&s.row) {
            let name = text_of(&element, &s.name);
            let onclick = element.value().attr(&s.link_attr).unwrap_or("").trim();
            let Some(link) = link_from_onclick(onclick) else {
                warn!("Listing row {:?} has no detail link, skipping", name);
                continue;
            };

            rows.push(ListingRow {
                name,
                facility_type: text_of(&element, &s.facility_type),
                community: text_of(&element, &s.community),
                address: text_of(&element, &s.address),
                phone: text_of(&element, &s.phone),
                detail_link: link.to_string(),
            });
        }

        Ok(rows)
    }

    fn parse_detail(&self, html: &str) -> Result<DetailPage, ParserError> {
        let document = Html::parse_document(html);
        let s = &self.detail;
        let mut page = DetailPage::default();

        for element in document.select(&s.summary_row) {
            let label = text_of(&element, &s.label);
            let field = text_of(&element, &s.field);
            match label.as_str() {
                OUTSTANDING_NONCRITICAL_LABEL => page.outstanding_noncritical = Some(field),
                OUTSTANDING_CRITICAL_LABEL => page.outstanding_critical = Some(field),
                _ => {}
            }
        }

        for element in document.select(&s.inspection_row) {
            page.inspections.push(InspectionRow {
                date: text_of(&element, &s.date),
                number: text_of(&element, &s.number),
                reason: text_of(&element, &s.reason),
                critical: text_of(&element, &s.critical),
                noncritical: text_of(&element, &s.noncritical),
            });
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <table>
          <tr class="hovereffect" onclick="location.href='/FoodPremises/Details/AAA'">
            <td class="facilityName"> Alpha Cafe </td>
            <td class="facilityType">Restaurant</td>
            <td class="community">Vancouver - Westside</td>
            <td class="siteAddress">1 Main St</td>
            <td class="phoneNumber">604-555-0100</td>
          </tr>
          <tr class="hovereffect">
            <td class="facilityName">No Link Diner</td>
          </tr>
        </table>"#;

    const DETAIL: &str = r#"
        <table>
          <tr class="nozebrastripes"><td class="display-label">Outstanding Critical Infractions</td><td class="display-field"> 2 </td></tr>
          <tr class="nozebrastripes"><td class="display-label">Outstanding Non-Critical Infractions</td><td class="display-field">5</td></tr>
          <tr class="nozebrastripes"><td class="display-label">Facility Type</td><td class="display-field">Cafe</td></tr>
        </table>
        <table>
          <tr class="hovereffect">
            <td class="inspectionDate">07-Mar-2019</td>
            <td class="inspectionNumber">INS-1</td>
            <td class="inspectionType">Routine</td>
            <td class="criticalInfractionsCount">1</td>
            <td class="nonCriticalInfractionsCount">3</td>
          </tr>
        </table>"#;

    #[test]
    fn listing_rows_are_extracted_and_linkless_rows_skipped() {
        let parser = VchaParser::new().unwrap();
        let rows = parser.parse_listing(LISTING).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alpha Cafe");
        assert_eq!(rows[0].community, "Vancouver - Westside");
        assert_eq!(rows[0].detail_link, "/FoodPremises/Details/AAA");
    }

    #[test]
    fn detail_page_summary_and_inspections() {
        let parser = VchaParser::new().unwrap();
        let page = parser.parse_detail(DETAIL).unwrap();

        assert_eq!(page.outstanding_critical.as_deref(), Some("2"));
        assert_eq!(page.outstanding_noncritical.as_deref(), Some("5"));
        assert_eq!(page.inspections.len(), 1);
        assert_eq!(page.inspections[0].date, "07-Mar-2019");
        assert_eq!(page.inspections[0].reason, "Routine");
        assert_eq!(page.inspections[0].noncritical, "3");
    }

    #[test]
    fn bad_selector_is_rejected() {
        let schema = ListingSchema {
            row: "tr[".into(),
            ..ListingSchema::default()
        };
        let result = VchaParser::with_schemas(&schema, &DetailSchema::default());
        assert!(matches!(result, Err(ParserError::HtmlParseError(_))));
    }
}
