use crate::model::{Restaurant, StatsError};
use crate::utils::parse_inspection_date;
use chrono::{Months, NaiveDate};

/// Start of the past-year window: inspections must be strictly after this date.
pub fn year_before(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN)
}

/// Recomputes `infractions_total` and `infractions_past_year` for every restaurant.
///
/// All-or-nothing: every date is parsed before any record is touched, so a
/// malformed date leaves the previous figures in place.
pub fn compute_infraction_stats(
    restaurants: &mut [Restaurant],
    as_of: NaiveDate,
) -> Result<(), StatsError> {
    let window_start = year_before(as_of);

    let mut computed = Vec::with_capacity(restaurants.len());
    for restaurant in restaurants.iter() {
        let mut past_year = 0;
        let mut total = 0;
        for inspection in &restaurant.inspections {
            let date = parse_inspection_date(&inspection.date).map_err(|source| {
                StatsError::DateParse {
                    restaurant: restaurant.name.clone(),
                    date: inspection.date.clone(),
                    source,
                }
            })?;
            if date > window_start {
                past_year = inspection.infractions().saturating_add(past_year);
            }
            total = inspection.infractions().saturating_add(total);
        }
        computed.push((past_year, total));
    }

    for (restaurant, (past_year, total)) in restaurants.iter_mut().zip(computed) {
        restaurant.infractions_past_year = past_year;
        restaurant.infractions_total = total;
    }
    Ok(())
}
