use serde::{Deserialize, Serialize};

/// A marketplace listing as supplied by the inventory source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    /// Current listing price in minor units (cents)
    pub price_cents: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

impl Listing {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price_cents,
            quantity: default_quantity(),
            category: None,
            keywords: Vec::new(),
            image_url: None,
            url: None,
        }
    }

    /// Text the pricing engine matches keywords against: title, category and keywords.
    pub fn descriptor(&self) -> String {
        let mut parts: Vec<&str> = vec![self.title.as_str()];
        if let Some(category) = &self.category {
            parts.push(category);
        }
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.join(" ")
    }
}
