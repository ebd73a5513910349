use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::KeywordTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ContactInfo,
    Summary,
    Experience,
    Education,
    Skills,
    Accomplishments,
    ExtraActivity,
}

impl Category {
    /// Keyword tests run in this order; the first hit wins.
    pub const PRIORITY: [Category; 6] = [
        Category::Summary,
        Category::Experience,
        Category::Skills,
        Category::Education,
        Category::Accomplishments,
        Category::ExtraActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ContactInfo => "contact_info",
            Category::Summary => "summary",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Skills => "skills",
            Category::Accomplishments => "accomplishments",
            Category::ExtraActivity => "extra_activity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line recognised as a section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub category: Category,
    /// Lowercased, trimmed heading text.
    pub text: String,
}

/// Decide whether `line` opens a section.
///
/// Headings are assumed to start with a capital letter, so empty lines and
/// lines whose first character is lowercase are rejected before any keyword
/// test. Leading whitespace is not lowercase and does not disqualify a line.
pub fn classify_line(line: &str, keywords: &KeywordTable) -> Option<Heading> {
    let first = line.chars().next()?;
    if first.is_lowercase() {
        return None;
    }

    let text = line.trim().to_lowercase();
    Category::PRIORITY
        .iter()
        .find(|category| {
            keywords
                .keywords(**category)
                .iter()
                .any(|kw| text.contains(kw.as_str()))
        })
        .map(|category| Heading {
            category: *category,
            text,
        })
}
