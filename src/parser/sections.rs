use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::headings::{classify_line, Category};
use super::ParseError;
use crate::config::KeywordTable;

/// One heading occurrence and the half-open line range it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub category: Category,
    pub heading: String,
    pub start: usize,
    pub end: usize,
}

impl Section {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Borrowed view of a section's lines.
#[derive(Debug, Clone, Copy)]
pub struct SectionBlock<'a> {
    pub category: Category,
    pub heading: &'a str,
    pub start: usize,
    pub lines: &'a [String],
}

impl<'a> SectionBlock<'a> {
    /// Lines after the heading that do not repeat the heading text, with
    /// their document line numbers.
    pub fn body(&self) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let heading = self.heading;
        let start = self.start;
        let lines = self.lines;
        lines
            .iter()
            .enumerate()
            .skip(1)
            .map(move |(i, line)| (start + i, line.as_str()))
            .filter(move |(_, line)| !line.trim().to_lowercase().contains(heading))
    }
}

#[derive(Debug)]
pub struct SegmentedDocument<'a> {
    lines: &'a [String],
    sections: Vec<Section>,
}

/// Split `lines` at every heading into a contact block and section blocks.
///
/// Sections are identified by (category, start line), so two headings with
/// the same text both keep their blocks.
pub fn segment<'a>(
    lines: &'a [String],
    keywords: &KeywordTable,
) -> Result<SegmentedDocument<'a>, ParseError> {
    let mut found: Vec<(usize, Category, String)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(heading) = classify_line(line, keywords) {
            debug!(line = i, category = %heading.category, heading = %heading.text, "heading");
            found.push((i, heading.category, heading.text));
        }
    }

    if found.is_empty() {
        return Err(ParseError::NoHeadings {
            line_count: lines.len(),
        });
    }

    let ends: Vec<usize> = found
        .iter()
        .skip(1)
        .map(|(start, _, _)| *start)
        .chain(std::iter::once(lines.len()))
        .collect();

    let sections = found
        .into_iter()
        .zip(ends)
        .map(|((start, category, heading), end)| Section {
            category,
            heading,
            start,
            end,
        })
        .collect();

    Ok(SegmentedDocument { lines, sections })
}

impl<'a> SegmentedDocument<'a> {
    pub fn lines(&self) -> &'a [String] {
        self.lines
    }

    /// Lines before the first heading.
    pub fn contact_block(&self) -> &'a [String] {
        &self.lines[..self.sections[0].start]
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Start line of every heading, in document order.
    pub fn section_index(&self) -> Vec<usize> {
        self.sections.iter().map(|s| s.start).collect()
    }

    pub fn block<'s>(&'s self, section: &'s Section) -> SectionBlock<'s> {
        SectionBlock {
            category: section.category,
            heading: &section.heading,
            start: section.start,
            lines: &self.lines[section.start..section.end],
        }
    }

    /// Every block of `category`, in document order.
    pub fn blocks(&self, category: Category) -> impl Iterator<Item = SectionBlock<'_>> + '_ {
        self.sections
            .iter()
            .filter(move |s| s.category == category)
            .map(move |s| self.block(s))
    }

    /// Blocks grouped by category. Repeated heading texts stay separate entries.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<SectionBlock<'_>>> {
        let mut map: BTreeMap<Category, Vec<SectionBlock<'_>>> = BTreeMap::new();
        for section in &self.sections {
            map.entry(section.category)
                .or_default()
                .push(self.block(section));
        }
        map
    }
}
