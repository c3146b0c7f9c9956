//! Intent routing: map an inbound message to the agent category that should answer it.
//!
//! Matching is plain lowercase substring search against static keyword lists. Categories are
//! checked in a fixed priority order (restaurant, then weather); anything else is general.

use std::fmt;

/// Agent category chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Restaurant,
    Weather,
    General,
}

impl Category {
    /// Lowercase label used in logs and the `classify` command.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Weather => "weather",
            Category::General => "general",
        }
    }

    /// Agent name shown to the user when its reply fails (e.g. "Weather agent error: ...").
    pub fn agent_name(self) -> &'static str {
        match self {
            Category::Restaurant => "Restaurant",
            Category::Weather => "Weather",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RESTAURANT_KEYWORDS: &[&str] = &[
    "food", "khana", "restaurant", "menu", "order", "pizza", "biryani", "karahi", "nihari", "chai",
];

const WEATHER_KEYWORDS: &[&str] = &[
    "weather", "mausam", "temperature", "garmi", "sardi", "barish", "dhoop", "thanda",
];

/// Keyword lists in priority order. The first category with any hit wins.
const KEYWORD_SETS: &[(Category, &[&str])] = &[
    (Category::Restaurant, RESTAURANT_KEYWORDS),
    (Category::Weather, WEATHER_KEYWORDS),
];

/// Classify a message. Total: empty or unmatched text is `General`.
pub fn classify(text: &str) -> Category {
    if text.is_empty() {
        return Category::General;
    }
    let lower = text.to_lowercase();
    KEYWORD_SETS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restaurant_keywords_route_to_restaurant() {
        for text in ["I want pizza", "biryani kahan milegi", "menu dikhao", "ek cup chai"] {
            assert_eq!(classify(text), Category::Restaurant, "{text}");
        }
    }

    #[test]
    fn restaurant_wins_over_weather() {
        assert_eq!(classify("garmi mein thanda khana"), Category::Restaurant);
        assert_eq!(classify("weather is nice, order pizza"), Category::Restaurant);
    }

    #[test]
    fn weather_without_restaurant_words() {
        assert_eq!(classify("mausam kaisa hai"), Category::Weather);
        assert_eq!(classify("aaj barish hogi?"), Category::Weather);
    }

    #[test]
    fn empty_and_unmatched_are_general() {
        assert_eq!(classify(""), Category::General);
        assert_eq!(classify("   "), Category::General);
        assert_eq!(classify("hello, how are you?"), Category::General);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("PIZZA"), classify("pizza"));
        assert_eq!(classify("MAUSAM"), Category::Weather);
    }

    #[test]
    fn substring_hits_count() {
        // "ordered" contains "order"
        assert_eq!(classify("I ordered yesterday"), Category::Restaurant);
    }
}
