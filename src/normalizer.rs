use crate::model::{Inspection, Restaurant};
use crate::parser::{DetailPage, ListingRow};
use crate::utils::id_from_detail_link;
use reqwest::Url;
use std::collections::HashMap;
use tracing::{info, warn};

/// Builds fresh restaurant records from listing rows. Relative detail links
/// are resolved against the listing URL.
pub fn restaurants_from_listing(rows: Vec<ListingRow>, listing_url: &str) -> Vec<Restaurant> {
    let base = Url::parse(listing_url).ok();
    rows.into_iter()
        .map(|row| {
            let detail_url = resolve_link(base.as_ref(), &row.detail_link);
            Restaurant {
                id: id_from_detail_link(&row.detail_link),
                name: row.name,
                facility_type: row.facility_type,
                community: row.community,
                address: row.address,
                phone: row.phone,
                detail_url,
                ..Restaurant::default()
            }
        })
        .collect()
}

fn resolve_link(base: Option<&Url>, link: &str) -> String {
    match base.map(|b| b.join(link)) {
        Some(Ok(url)) => url.to_string(),
        Some(Err(e)) => {
            warn!("Cannot resolve detail link {:?}: {}", link, e);
            link.to_string()
        }
        None => link.to_string(),
    }
}

/// Carries fetched detail and coordinates from `previous` into `fresh`,
/// matching on the stable id. Listing fields always come from `fresh`.
pub fn merge_by_id(previous: Vec<Restaurant>, fresh: Vec<Restaurant>) -> Vec<Restaurant> {
    let mut known: HashMap<String, Restaurant> = previous
        .into_iter()
        .filter(|r| !r.id.is_empty())
        .map(|r| (r.id.clone(), r))
        .collect();

    let mut carried = 0;
    let merged: Vec<Restaurant> = fresh
        .into_iter()
        .map(|mut r| {
            if let Some(old) = known.remove(&r.id) {
                r.inspections = old.inspections;
                r.outstanding_noncritical = old.outstanding_noncritical;
                r.outstanding_critical = old.outstanding_critical;
                if old.address == r.address {
                    r.location = old.location;
                }
                carried += 1;
            }
            r
        })
        .collect();

    info!("Listing refresh: {} restaurants, {} carried over by id", merged.len(), carried);
    merged
}

/// Writes a parsed detail page onto its restaurant record.
pub fn apply_detail(restaurant: &mut Restaurant, page: DetailPage) {
    if let Some(text) = &page.outstanding_noncritical {
        restaurant.outstanding_noncritical = parse_count(text, "outstanding non-critical");
    }
    if let Some(text) = &page.outstanding_critical {
        restaurant.outstanding_critical = parse_count(text, "outstanding critical");
    }

    restaurant.inspections = page
        .inspections
        .into_iter()
        .map(|row| Inspection {
            critical_count: parse_count(&row.critical, "critical"),
            noncritical_count: parse_count(&row.noncritical, "non-critical"),
            date: row.date,
            identifier: row.number,
            reason: row.reason,
        })
        .collect();
}

/// Coerces an infraction count. Bad or negative input is logged and counts as zero.
pub fn parse_count(text: &str, field: &str) -> i32 {
    match text.trim().parse::<i32>() {
        Ok(n) if n >= 0 => n,
        Ok(n) => {
            warn!("Negative {} count {}", field, n);
            0
        }
        Err(e) => {
            warn!("Invalid {} count {:?}: {}", field, text, e);
            0
        }
    }
}
