use crate::model::Restaurant;

fn is_west_of(restaurant: &Restaurant, border_longitude: f64) -> bool {
    restaurant.location.longitude < border_longitude
}

/// Restaurants strictly west of `border_longitude`, in their original order.
/// Ungeocoded restaurants (longitude 0) only pass if 0 is west of the border.
pub fn select_subset(restaurants: &[Restaurant], border_longitude: f64) -> Vec<&Restaurant> {
    restaurants
        .iter()
        .filter(|r| is_west_of(r, border_longitude))
        .collect()
}

/// Mutable variant of [`select_subset`], used to hand records to the detail scheduler.
pub fn select_subset_mut(
    restaurants: &mut [Restaurant],
    border_longitude: f64,
) -> Vec<&mut Restaurant> {
    restaurants
        .iter_mut()
        .filter(|r| is_west_of(r, border_longitude))
        .collect()
}

/// Orders restaurants by ascending past-year infractions; ties keep their order.
pub fn rank_by_recent_infractions(restaurants: &mut [&Restaurant]) {
    restaurants.sort_by_key(|r| r.infractions_past_year);
}
