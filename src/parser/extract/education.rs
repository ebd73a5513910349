use serde::Serialize;

use super::tokenize;
use crate::config::EducationRules;
use crate::parser::headings::Category;
use crate::parser::sections::SegmentedDocument;

/// Universities and degrees are collected independently and are not paired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EducationRecords {
    pub universities: Vec<String>,
    pub degrees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationRow {
    pub university: String,
    pub degree: String,
}

impl EducationRecords {
    pub fn is_empty(&self) -> bool {
        self.universities.is_empty() && self.degrees.is_empty()
    }

    pub fn rows(&self) -> Vec<EducationRow> {
        let len = self.universities.len().max(self.degrees.len());
        (0..len)
            .map(|i| EducationRow {
                university: self.universities.get(i).cloned().unwrap_or_default(),
                degree: self.degrees.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

pub fn extract(doc: &SegmentedDocument<'_>, rules: &EducationRules) -> EducationRecords {
    let mut records = EducationRecords::default();

    for block in doc.blocks(Category::Education) {
        for (_, line) in block.body() {
            let lowered = line.trim().to_lowercase();
            let mut tokens = tokenize(&lowered);
            if tokens
                .first()
                .is_some_and(|t| rules.bullet_artifacts.iter().any(|a| a.as_str() == *t))
            {
                tokens.remove(0);
            }

            if tokens.contains(&rules.university_keyword.as_str()) {
                records.universities.push(tokens.join(" "));
                continue;
            }
            if tokens
                .iter()
                .any(|t| rules.degree_keywords.iter().any(|k| k.as_str() == *t))
            {
                records.degrees.push(tokens.join(" ").replace('{', "-"));
            }
        }
    }

    records
}
