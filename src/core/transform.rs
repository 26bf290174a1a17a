//! Reshapes business search results into rows of the website import template.

use crate::domain::model::{Business, OutputRow};
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Always searched, ahead of any user supplied categories.
pub const BASE_CATEGORIES: [&str; 2] = ["vegan", "vegetarian"];
pub const SEARCH_TERM: &str = "restaurants";
pub const SORT_BY: &str = "best_match";
/// Meters; close to the API's upper bound.
pub const SEARCH_RADIUS: u32 = 40_000;

pub const MENU_LINK_PLACEHOLDER: &str = "Check The Website for a Menu";
pub const PLACEHOLDER_IMAGE: &str = "https://img.freepik.com/premium-vector/default-image-icon-vector-missing-picture-page-website-design-mobile-app-no-photo-available_87543-11093.jpg";
pub const DEFAULT_PRICE_LABEL: &str = "Moderate";

const PRICE_SYMBOLS: [char; 2] = ['$', '€'];

/// `vegan,vegetarian` followed by the extra aliases.
pub fn search_categories(extra: &[String]) -> String {
    BASE_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .chain(extra.iter().cloned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Pulls the `businesses` array out of a search response.
pub fn parse_businesses(response: &Value) -> Result<Vec<Business>> {
    let businesses = response
        .get("businesses")
        .and_then(Value::as_array)
        .ok_or_else(|| EtlError::MalformedResponse {
            message: "response has no `businesses` array".to_string(),
        })?;

    businesses
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            Business::deserialize(raw).map_err(|e| EtlError::SchemaError {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Whitespace-only strings count as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Maps a one to three symbol price tier (`$` or `€`) to its label.
/// Missing tiers get the default; anything else is kept verbatim.
pub fn price_label(price: Option<&str>) -> String {
    let Some(price) = price.map(str::trim).filter(|p| !p.is_empty()) else {
        return DEFAULT_PRICE_LABEL.to_string();
    };

    let single_symbol = PRICE_SYMBOLS
        .iter()
        .any(|&symbol| price.chars().all(|c| c == symbol));

    match (single_symbol, price.chars().count()) {
        (true, 1) => "Cheap",
        (true, 2) => "Moderate",
        (true, 3) => "Expensive",
        _ => price,
    }
    .to_string()
}

pub fn format_categories<S: AsRef<str>>(titles: &[S]) -> String {
    titles
        .iter()
        .map(|title| match title.as_ref() {
            "Vegan" => "Vegan Options",
            "Vegetarian" => "Vegetarian Friendly",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn join_address<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn to_output_row(business: Business) -> OutputRow {
    let titles: Vec<&str> = business
        .categories
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    let price = non_blank(business.price);

    OutputRow {
        restaurant_text: non_blank(Some(business.name)),
        location: join_address(&business.location.display_address),
        category: format_categories(&titles),
        restaurant_link: non_blank(Some(business.url)),
        menu_link: MENU_LINK_PLACEHOLDER.to_string(),
        price_rate: price_label(price.as_deref()),
        city: non_blank(business.location.city),
        state: non_blank(business.location.state),
        image: non_blank(business.image_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
    }
}

/// Drops rows identical to an earlier one. Returns the kept rows and the number dropped.
pub fn dedup_rows(rows: Vec<OutputRow>) -> (Vec<OutputRow>, usize) {
    let total = rows.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<OutputRow> = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// CSV bytes for `rows`, with the column header line first when asked for.
pub fn encode_rows(rows: &[OutputRow], include_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if include_header {
        writer.write_record(OutputRow::COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
