//! Keyword categorization engine
//!
//! Maps a free-text description to exactly one [`Category`]. The keyword
//! table is an ordered list: categories are tried in declaration order and
//! the first category with a matching keyword wins, so keyword overlap between
//! categories always resolves to the earlier entry.
//!
//! ## Match modes
//!
//! Descriptions are normalized (every character other than an ASCII letter or
//! whitespace becomes a space, then uppercased) and split into words.
//!
//! - [`MatchMode::Token`] checks each keyword verbatim against the *set* of
//!   words. A keyword containing a space, digit or punctuation ("AMAZON PRIME",
//!   "76", "AT&T") can never be a member of that set and therefore never
//!   matches. This is the historical behavior and the default.
//! - [`MatchMode::Phrase`] normalizes each keyword the same way as the
//!   description and matches when its words appear contiguously in the
//!   description's words. "AMAZON PRIME" and "AT&T" become reachable; "76"
//!   normalizes to nothing and stays unreachable.

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::MatchMode;
use crate::models::Category;

/// Category keyword table, in match priority order
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Groceries,
        &[
            "WALMART",
            "KROGER",
            "SAFEWAY",
            "PUBLIX",
            "COSTCO",
            "SUPERCENTER",
            "GROCERY",
        ],
    ),
    (
        Category::GasAutomotive,
        &["SHELL", "EXXON", "MOBIL", "BP", "CHEVRON", "76", "GAS", "AUTO"],
    ),
    (
        Category::RestaurantsDining,
        &[
            "MCDONALD'S",
            "STARBUCKS",
            "SUBWAY",
            "CAFE",
            "RESTAURANT",
            "DINER",
        ],
    ),
    (
        Category::Utilities,
        &[
            "COMCAST", "VERIZON", "AT&T", "T-MOBILE", "ELECTRIC", "WATER", "UTILITY",
        ],
    ),
    (
        Category::SubscriptionsEntertainment,
        &["NETFLIX", "SPOTIFY", "HULU", "DISNEY+", "AMAZON PRIME", "AMC"],
    ),
    (
        Category::ShoppingGeneral,
        &["AMAZON", "TARGET", "BEST BUY", "HOME DEPOT", "LOWE'S", "AMZ"],
    ),
    (
        Category::TravelTransport,
        &[
            "UBER", "LYFT", "AMERICAN", "DELTA", "AIRLINES", "MARRIOTT", "HOTEL",
        ],
    ),
    (
        Category::HealthWellness,
        &["CVS", "WALGREENS", "PHARMACY", "FITNESS", "GYM"],
    ),
];

/// A keyword prepared for both match modes
#[derive(Debug, Clone)]
struct Keyword {
    raw: String,
    /// Normalized word sequence (used by phrase mode)
    words: Vec<String>,
}

impl Keyword {
    /// Whether the keyword can ever be a member of a token set
    fn is_single_token(&self) -> bool {
        !self.raw.is_empty() && self.raw.chars().all(|c| c.is_ascii_uppercase())
    }

    fn is_reachable(&self, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Token => self.is_single_token(),
            MatchMode::Phrase => !self.words.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryRule {
    category: Category,
    keywords: Vec<Keyword>,
}

/// Rule engine assigning one category per description
#[derive(Debug, Clone)]
pub struct Categorizer {
    mode: MatchMode,
    rules: Vec<CategoryRule>,
    strip: Regex,
}

impl Categorizer {
    /// Build an engine over the default keyword table
    pub fn new(mode: MatchMode) -> Self {
        let table = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                (
                    *category,
                    keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect();
        Self::with_table(mode, table)
    }

    /// Build an engine over a custom ordered table
    pub fn with_table(mode: MatchMode, table: Vec<(Category, Vec<String>)>) -> Self {
        let strip = Regex::new(r"[^a-zA-Z\s]").expect("valid regex");

        let rules = table
            .into_iter()
            .map(|(category, keywords)| CategoryRule {
                category,
                keywords: keywords
                    .into_iter()
                    .map(|raw| Keyword {
                        words: split_words(&normalize_with(&strip, &raw)),
                        raw,
                    })
                    .collect(),
            })
            .collect();

        let categorizer = Self { mode, rules, strip };

        let unreachable = categorizer.unreachable_keywords();
        if !unreachable.is_empty() {
            let listed: Vec<String> = unreachable
                .iter()
                .map(|(category, keyword)| format!("{} ({})", keyword, category))
                .collect();
            warn!(
                mode = %mode,
                keywords = %listed.join(", "),
                "Some category keywords can never match in this mode"
            );
        }

        categorizer
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Keywords that cannot match under the current mode, in table order
    pub fn unreachable_keywords(&self) -> Vec<(Category, &str)> {
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.keywords
                    .iter()
                    .filter(|k| !k.is_reachable(self.mode))
                    .map(move |k| (rule.category, k.raw.as_str()))
            })
            .collect()
    }

    /// Normalize a description: non-letters become spaces, then uppercase
    pub fn normalize(&self, description: &str) -> String {
        normalize_with(&self.strip, description)
    }

    /// Categorize a record's description cell
    ///
    /// Absent or non-text values yield [`Category::NotAvailable`]: no
    /// categorization was attempted.
    pub fn categorize_value(&self, value: Option<&Value>) -> Category {
        match value {
            Some(Value::String(s)) => self.categorize(s),
            _ => Category::NotAvailable,
        }
    }

    /// Categorize a description string
    ///
    /// Returns the first category in table order with a matching keyword, or
    /// [`Category::Miscellaneous`] when nothing matches.
    pub fn categorize(&self, description: &str) -> Category {
        let normalized = self.normalize(description);
        let words = split_words(&normalized);

        let matched = match self.mode {
            MatchMode::Token => {
                let tokens: std::collections::HashSet<&str> =
                    words.iter().map(|w| w.as_str()).collect();
                self.first_match(|k| tokens.contains(k.raw.as_str()))
            }
            MatchMode::Phrase => self.first_match(|k| contains_phrase(&words, &k.words)),
        };

        let category = matched.unwrap_or(Category::Miscellaneous);
        debug!(description, category = %category, "Categorized description");
        category
    }

    fn first_match(&self, matches: impl Fn(&Keyword) -> bool) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(&matches))
            .map(|rule| rule.category)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(MatchMode::default())
    }
}

fn normalize_with(strip: &Regex, text: &str) -> String {
    strip.replace_all(text, " ").to_uppercase()
}

fn split_words(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(String::from).collect()
}

/// Contiguous word-sequence containment; an empty phrase never matches
fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}
