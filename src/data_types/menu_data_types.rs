use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    // "new", "more", "bar", ...
    #[serde(rename = "type", default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<u64>,
}

impl Category {
    pub fn has_type(&self, tag: &str) -> bool {
        self.category_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dish {
    pub id: u64,
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_weight_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub is_archived: bool,
}

impl Dish {
    /// weight/volume text as shown under the price
    pub fn portion_label(&self) -> Option<&str> {
        self.volume_weight_display
            .as_deref()
            .or(self.volume.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Decimal columns arrive either as JSON numbers or as strings ("350.00").
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_price_accepts_decimal_strings() {
        let dish: Dish =
            serde_json::from_str(r#"{"id": 5, "name": "Борщ", "price": "300.50"}"#).unwrap();
        assert_eq!(dish.price, 300.5);
        assert!(!dish.is_archived);
        assert_eq!(dish.portion_label(), None);
    }

    #[test]
    fn category_type_is_read_from_type_field() {
        let cat: Category =
            serde_json::from_str(r#"{"id": 1, "name": "Новинки", "type": "new"}"#).unwrap();
        assert!(cat.has_type("new"));
        assert!(!cat.has_type("bar"));
    }
}
