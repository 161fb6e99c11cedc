// Markdown table of the ranked restaurants
use crate::model::Restaurant;

const HEADER: &str = "|Name|Infractions (Past Year)|Infractions (Total)|Outstanding Critical Infractions|Outstanding Non-Critical Infractions||";
const DIVIDER: &str = "|---|---|---|---|---|---|";

/// One row per restaurant with recorded inspections, in the given order.
pub fn render_markdown(restaurants: &[&Restaurant]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(DIVIDER);
    out.push('\n');

    for r in restaurants.iter().filter(|r| r.has_details()) {
        out.push_str(&format!(
            "|{}|{}|{}|{}|{}|[Details]({})|\n",
            escape_cell(&r.name),
            r.infractions_past_year,
            r.infractions_total,
            r.outstanding_critical,
            r.outstanding_noncritical,
            r.detail_url
        ));
    }
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Inspection;

    #[test]
    fn omits_restaurants_without_inspections() {
        let fetched = Restaurant {
            name: "Pipe | Grill".into(),
            detail_url: "https://example.org/d/1".into(),
            inspections: vec![Inspection::default()],
            infractions_past_year: 1,
            infractions_total: 3,
            outstanding_critical: 2,
            outstanding_noncritical: 4,
            ..Restaurant::default()
        };
        let unfetched = Restaurant { name: "Nothing yet".into(), ..Restaurant::default() };

        let report = render_markdown(&[&unfetched, &fetched]);
        let lines: Vec<_> = report.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[2], "|Pipe \\| Grill|1|3|2|4|[Details](https://example.org/d/1)|");
    }
}
