use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-category statistics as published in the market index (dollar amounts).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryStats {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub sold_count: u64,
    #[serde(default)]
    pub min_price: f64,
    #[serde(default)]
    pub max_price: f64,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub median_price: f64,
    #[serde(default)]
    pub sold_avg: f64,
    #[serde(default)]
    pub sold_median: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketIndex {
    #[serde(default)]
    pub generated: Option<String>,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub categories: HashMap<String, CategoryStats>,
}

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("Market index is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketQuote {
    pub category: String,
    pub count: u64,
    pub sold_count: u64,
    pub min_price_cents: i64,
    pub max_price_cents: i64,
    pub avg_price_cents: i64,
    pub median_price_cents: i64,
    pub sold_avg_cents: i64,
    pub sold_median_cents: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub count: u64,
    pub sold_count: u64,
    pub avg_price_cents: i64,
    pub median_price_cents: i64,
    pub sold_median_cents: i64,
}

impl MarketIndex {
    pub fn from_json(source: &str) -> Result<Self, MarketError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn quote(&self, category: &str) -> Option<MarketQuote> {
        self.categories.get(category).map(|stats| MarketQuote {
            category: category.to_string(),
            count: stats.count,
            sold_count: stats.sold_count,
            min_price_cents: dollars_to_cents(stats.min_price),
            max_price_cents: dollars_to_cents(stats.max_price),
            avg_price_cents: dollars_to_cents(stats.avg_price),
            median_price_cents: dollars_to_cents(stats.median_price),
            sold_avg_cents: dollars_to_cents(stats.sold_avg),
            sold_median_cents: dollars_to_cents(stats.sold_median),
        })
    }

    /// Categories by listing count, largest first.
    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        let mut summaries: Vec<CategorySummary> = self
            .categories
            .iter()
            .map(|(category, stats)| CategorySummary {
                category: category.clone(),
                count: stats.count,
                sold_count: stats.sold_count,
                avg_price_cents: dollars_to_cents(stats.avg_price),
                median_price_cents: dollars_to_cents(stats.median_price),
                sold_median_cents: dollars_to_cents(stats.sold_median),
            })
            .collect();

        summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        summaries
    }
}

/// Maps item text to a market category. `require` is a list of keyword groups;
/// every group needs at least one keyword present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRule {
    pub category: String,
    pub require: Vec<Vec<String>>,
}

impl CategoryRule {
    fn new(category: &str, require: &[&[&str]]) -> Self {
        Self {
            category: category.to_string(),
            require: require
                .iter()
                .map(|group| group.iter().map(|kw| kw.to_string()).collect())
                .collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.require
            .iter()
            .all(|group| group.iter().any(|kw| text.contains(kw.as_str())))
    }
}

/// Ordered category rules; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

const KAWS: &[&str] = &["kaws"];
const BEARBRICK: &[&str] = &["bearbrick", "be@rbrick"];
const FAIREY: &[&str] = &["shepard fairey", "obey giant"];

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn categorize(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.category.as_str())
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new("KAWS - Bearbrick 1000%", &[KAWS, &["1000%", "1000 %"]]),
            CategoryRule::new("KAWS - Bearbrick 400%", &[KAWS, BEARBRICK, &["400%"]]),
            CategoryRule::new("KAWS - Bearbrick 100%", &[KAWS, BEARBRICK, &["100%"]]),
            CategoryRule::new("KAWS - Bearbrick", &[KAWS, BEARBRICK]),
            CategoryRule::new("KAWS - Companion", &[KAWS, &["companion"]]),
            CategoryRule::new("KAWS - Chum", &[KAWS, &["chum"]]),
            CategoryRule::new("KAWS - BFF", &[KAWS, &["bff"]]),
            CategoryRule::new("KAWS - Other", &[KAWS]),
            CategoryRule::new("Bearbrick - 1000%", &[BEARBRICK, &["1000%"]]),
            CategoryRule::new("Bearbrick - 400%", &[BEARBRICK, &["400%"]]),
            CategoryRule::new("Bearbrick - 100%", &[BEARBRICK, &["100%"]]),
            CategoryRule::new("Bearbrick - Basquiat", &[BEARBRICK, &["basquiat"]]),
            CategoryRule::new("Bearbrick - Other", &[BEARBRICK]),
            CategoryRule::new("Shepard Fairey - Hope", &[FAIREY, &["hope"]]),
            CategoryRule::new("Shepard Fairey - Make Art Not War", &[FAIREY, &["make art not war"]]),
            CategoryRule::new("Shepard Fairey - Peace", &[FAIREY, &["peace"]]),
            CategoryRule::new("Shepard Fairey - Print", &[FAIREY]),
            CategoryRule::new("Death NYC - Print", &[&["death nyc"]]),
            CategoryRule::new("Banksy - Print", &[&["banksy"]]),
        ])
    }
}

/// Quote for the category `text` falls into, when the index covers it.
pub fn market_price(index: &MarketIndex, categorizer: &Categorizer, text: &str) -> Option<MarketQuote> {
    let category = categorizer.categorize(text)?;
    index.quote(category)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Underpriced,
    Fair,
    Overpriced,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceAssessment {
    pub status: MarketStatus,
    pub market_median_cents: i64,
    pub market_avg_cents: i64,
    /// Distance from the sold median, one decimal place
    pub diff_percent: f64,
    pub suggestion: Option<String>,
    pub category: String,
    pub sample_size: u64,
}

/// Compare a price with the category's sold median: below 70% is underpriced,
/// above 150% overpriced.
pub fn assess_price(quote: &MarketQuote, price_cents: i64) -> Option<PriceAssessment> {
    if quote.sold_median_cents == 0 {
        return None;
    }

    let median = quote.sold_median_cents as f64;
    let price = price_cents as f64;
    let diff_percent = ((price - median) / median * 1000.0).round() / 10.0;
    let median_dollars = median / 100.0;

    let (status, suggestion) = if price < median * 0.7 {
        (MarketStatus::Underpriced, Some(format!("Consider raising to ${:.0}", median_dollars)))
    } else if price > median * 1.5 {
        (MarketStatus::Overpriced, Some(format!("Market median is ${:.0}", median_dollars)))
    } else {
        (MarketStatus::Fair, None)
    };

    Some(PriceAssessment {
        status,
        market_median_cents: quote.sold_median_cents,
        market_avg_cents: quote.sold_avg_cents,
        diff_percent,
        suggestion,
        category: quote.category.clone(),
        sample_size: quote.sold_count,
    })
}
