pub mod contact;
pub mod education;
pub mod skills;
pub mod work;

use serde::Serialize;

use super::headings::Category;
use super::sections::{Section, SegmentedDocument};
use super::ParseError;
use crate::config::ParserConfig;
use contact::{ContactExtractor, ContactRecord};
use education::{EducationRecords, EducationRow};
use work::WorkRecord;

/// Everything pulled out of one document. The email is the join key for
/// every table.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    pub contact: ContactRecord,
    pub work: Vec<WorkRecord>,
    pub education: EducationRecords,
    pub skills: Vec<String>,
    pub sections: Vec<Section>,
    pub line_count: usize,
}

impl ParsedResume {
    pub fn join_key(&self) -> &str {
        &self.contact.email
    }

    /// University and degree lists side by side, padded to the longer one.
    pub fn education_rows(&self) -> Vec<EducationRow> {
        self.education.rows()
    }

    pub fn section_count(&self, category: Category) -> usize {
        self.sections
            .iter()
            .filter(|s| s.category == category)
            .count()
    }
}

pub fn extract_all(
    doc: &SegmentedDocument<'_>,
    config: &ParserConfig,
    contact: &ContactExtractor,
) -> Result<ParsedResume, ParseError> {
    let contact = contact.extract(doc.contact_block())?;
    let work = work::extract(doc, &config.work);
    let education = education::extract(doc, &config.education);
    let skills = skills::extract(doc);

    Ok(ParsedResume {
        contact,
        work,
        education,
        skills,
        sections: doc.sections().to_vec(),
        line_count: doc.lines().len(),
    })
}

/// Split on commas, hyphens and whitespace, dropping empty pieces.
pub(crate) fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}
