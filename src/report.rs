use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::extract::ParsedResume;

/// One parsed file as emitted by `parse --json`.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub source: &'a str,
    pub parsed_at: DateTime<Utc>,
    pub email: &'a str,
    #[serde(flatten)]
    pub resume: &'a ParsedResume,
}

impl<'a> JsonReport<'a> {
    pub fn new(source: &'a str, resume: &'a ParsedResume, parsed_at: DateTime<Utc>) -> Self {
        JsonReport {
            source,
            parsed_at,
            email: resume.join_key(),
            resume,
        }
    }
}

pub fn render_json(reports: &[JsonReport<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Contact, work, education and skills tables, each keyed by email.
pub fn render_tables(source: &str, r: &ParsedResume) -> String {
    let key = truncate(r.join_key(), 28);
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ===", source);

    let _ = writeln!(out, "\n--- Contact ---");
    let _ = writeln!(out, "{:<28} | {:<24} | {:<20}", "Email", "Name", "Phone");
    let _ = writeln!(out, "{}", "-".repeat(78));
    let c = &r.contact;
    let _ = writeln!(
        out,
        "{:<28} | {:<24} | {:<20}",
        key,
        truncate(&c.name, 24),
        truncate(&c.phone, 20)
    );

    let _ = writeln!(out, "\n--- Work ---");
    if r.work.is_empty() {
        let _ = writeln!(out, "(none)");
    } else {
        let _ = writeln!(out, "{:<28} | {:<30} | {:<30}", "Email", "Company", "Position");
        let _ = writeln!(out, "{}", "-".repeat(94));
        for w in &r.work {
            let _ = writeln!(
                out,
                "{:<28} | {:<30} | {:<30}",
                key,
                truncate(&w.company, 30),
                truncate(&w.position, 30)
            );
        }
    }

    let _ = writeln!(out, "\n--- Education ---");
    let rows = r.education_rows();
    if rows.is_empty() {
        let _ = writeln!(out, "(none)");
    } else {
        let _ = writeln!(out, "{:<28} | {:<30} | {:<40}", "Email", "University", "Degree");
        let _ = writeln!(out, "{}", "-".repeat(104));
        for row in &rows {
            let _ = writeln!(
                out,
                "{:<28} | {:<30} | {:<40}",
                key,
                truncate(&row.university, 30),
                truncate(&row.degree, 40)
            );
        }
    }

    let _ = writeln!(out, "\n--- Skills ---");
    if r.skills.is_empty() {
        let _ = writeln!(out, "(none)");
    } else {
        let _ = writeln!(out, "{:<28} | {:<40}", "Email", "Skill");
        let _ = writeln!(out, "{}", "-".repeat(71));
        for skill in &r.skills {
            let _ = writeln!(out, "{:<28} | {:<40}", key, truncate(skill, 40));
        }
    }

    out
}

/// Section index followed by each section's half-open line range.
pub fn render_sections(source: &str, r: &ParsedResume) -> String {
    let mut out = String::new();
    let index: Vec<String> = r.sections.iter().map(|s| s.start.to_string()).collect();

    let _ = writeln!(out, "{} ({} lines)", source, r.line_count);
    let _ = writeln!(out, "Section index: [{}]", index.join(", "));
    let _ = writeln!(
        out,
        "{:>5} | {:>5} | {:>5} | {:<16} | {:<30}",
        "Start", "End", "Lines", "Category", "Heading"
    );
    let _ = writeln!(out, "{}", "-".repeat(72));
    for s in &r.sections {
        let _ = writeln!(
            out,
            "{:>5} | {:>5} | {:>5} | {:<16} | {:<30}",
            s.start,
            s.end,
            s.len(),
            s.category.as_str(),
            truncate(&s.heading, 30)
        );
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
