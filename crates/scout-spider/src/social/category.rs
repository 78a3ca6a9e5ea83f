use serde::{Deserialize, Serialize};

/// Expertise bucket of a financial commentator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fund Manager")]
    FundManager,
    Analyst,
    Trader,
    Economist,
    Journalist,
    #[serde(rename = "CEO/Entrepreneur")]
    CeoEntrepreneur,

    /// Catch-all, when no rule matches.
    Influencer,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::FundManager => "Fund Manager",
            Category::Analyst => "Analyst",
            Category::Trader => "Trader",
            Category::Economist => "Economist",
            Category::Journalist => "Journalist",
            Category::CeoEntrepreneur => "CEO/Entrepreneur",
            Category::Influencer => "Influencer",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A category, and the lower-case keywords that place a bio in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, bio: &str) -> bool {
        self.keywords.iter().any(|keyword| bio.contains(keyword.as_str()))
    }
}

/// Ordered keyword rules; the first rule with a keyword in the bio decides the category.
///
/// Keyword sets overlap ("Hedge fund CEO" hits both Fund Manager & CEO/Entrepreneur), so the
/// order of the rules is part of the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
    fallback: Category,
}

impl CategoryRules {
    pub fn new(rules: Vec<CategoryRule>, fallback: Category) -> Self {
        Self { rules, fallback }
    }

    /// Case-insensitive, substring keyword scan over `bio`.
    pub fn categorize(&self, bio: &str) -> Category {
        let bio = bio.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&bio))
            .map(|rule| rule.category)
            .unwrap_or(self.fallback)
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        use Category::*;
        Self::new(
            vec![
                CategoryRule::new(FundManager, &["fund", "portfolio", "asset management", "cio"]),
                CategoryRule::new(Analyst, &["analyst", "research"]),
                CategoryRule::new(Trader, &["trader", "trading", "options"]),
                CategoryRule::new(Economist, &["economist"]),
                CategoryRule::new(
                    Journalist,
                    &["journalist", "reporter", "cnbc", "bloomberg", "wsj"],
                ),
                CategoryRule::new(CeoEntrepreneur, &["ceo", "founder", "entrepreneur"]),
            ],
            Influencer,
        )
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
