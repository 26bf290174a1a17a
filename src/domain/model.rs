use serde::{Deserialize, Serialize};

/// One listing from the business search response. Only the fields the CSV
/// template needs are modeled; everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Business {
    pub name: String,
    pub image_url: Option<String>,
    pub url: String,
    pub categories: Vec<Category>,
    pub price: Option<String>,
    pub location: BusinessLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub display_address: Vec<String>,
}

/// A row of the website import template. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OutputRow {
    pub restaurant_text: Option<String>,
    pub location: String,
    pub category: String,
    pub restaurant_link: Option<String>,
    pub menu_link: String,
    pub price_rate: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub image: String,
}

impl OutputRow {
    pub const COLUMNS: [&'static str; 9] = [
        "restaurant_text",
        "location",
        "category",
        "restaurant_link",
        "menu_link",
        "price_rate",
        "city",
        "state",
        "image",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Replace the file, header included.
    #[default]
    #[serde(rename = "w")]
    Overwrite,
    /// Add rows after the existing content, no header.
    #[serde(rename = "a")]
    Append,
}

impl WriteMode {
    /// `a` appends; any other flag overwrites.
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim() {
            "a" => WriteMode::Append,
            "w" | "" => WriteMode::Overwrite,
            other => {
                tracing::warn!("Unknown write mode '{}', falling back to overwrite", other);
                WriteMode::Overwrite
            }
        }
    }

    pub fn as_flag(&self) -> &'static str {
        match self {
            WriteMode::Overwrite => "w",
            WriteMode::Append => "a",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<OutputRow>,
    pub fetched: usize,
    pub duplicates_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_from_flag() {
        assert_eq!(WriteMode::from_flag("w"), WriteMode::Overwrite);
        assert_eq!(WriteMode::from_flag("a"), WriteMode::Append);
        assert_eq!(WriteMode::from_flag(""), WriteMode::Overwrite);
        assert_eq!(WriteMode::from_flag("x"), WriteMode::Overwrite);
        assert_eq!(WriteMode::from_flag(" a "), WriteMode::Append);
    }

    #[test]
    fn test_business_ignores_extra_fields() {
        let business: Business = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "alias": "green-leaf",
            "name": "Green Leaf Cafe",
            "image_url": "",
            "is_closed": false,
            "url": "https://www.yelp.com/biz/green-leaf",
            "review_count": 12,
            "categories": [{"alias": "vegan", "title": "Vegan"}],
            "rating": 4.5,
            "coordinates": {"latitude": 1.0, "longitude": 2.0},
            "transactions": [],
            "location": {
                "address1": "123 Main St",
                "city": "Springfield",
                "zip_code": "12345",
                "country": "US",
                "state": "IL",
                "display_address": ["123 Main St", "Springfield"]
            },
            "phone": "+1555",
            "distance": 10.0
        }))
        .unwrap();

        assert_eq!(business.name, "Green Leaf Cafe");
        assert!(business.price.is_none());
        assert_eq!(business.categories[0].title, "Vegan");
        assert_eq!(business.location.display_address.len(), 2);
    }
}
