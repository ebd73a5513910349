use serde::Serialize;

use super::tokenize;
use crate::config::{PairingPolicy, WorkRules};
use crate::parser::headings::Category;
use crate::parser::sections::SegmentedDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkRecord {
    pub company: String,
    pub position: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleGuess {
    Company,
    Position,
    Unknown,
}

/// A line that looks like a company or a job title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCandidate {
    pub line: usize,
    pub tokens: Vec<String>,
    pub role: RoleGuess,
}

impl WorkCandidate {
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

pub fn extract(doc: &SegmentedDocument<'_>, rules: &WorkRules) -> Vec<WorkRecord> {
    let candidates = candidates(doc, rules);
    pair(&candidates, rules.pairing)
}

/// First pass: every capitalised short line of every experience block.
pub fn candidates(doc: &SegmentedDocument<'_>, rules: &WorkRules) -> Vec<WorkCandidate> {
    let mut out = Vec::new();
    for block in doc.blocks(Category::Experience) {
        for (line_no, line) in block.body() {
            let mut tokens = tokenize(line.trim());
            if tokens.first().is_some_and(|t| is_artifact(t)) {
                tokens.remove(0);
            }
            if !is_work_line(&tokens) {
                continue;
            }
            out.push(WorkCandidate {
                line: line_no,
                role: guess_role(&tokens, rules),
                tokens: tokens.into_iter().map(str::to_string).collect(),
            });
        }
    }
    out
}

/// Bullets and date fragments carry no letters.
fn is_artifact(token: &str) -> bool {
    !token.chars().any(char::is_alphabetic)
}

/// Every non-numeric token is all caps or title case, and at least one
/// token is a word.
pub fn is_work_line(tokens: &[&str]) -> bool {
    let mut words = tokens.iter().filter(|t| !is_numeric(t)).peekable();
    words.peek().is_some() && words.all(|t| is_upper(t) || is_title(t))
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(char::is_numeric)
}

/// At least one cased character and no lowercase ones.
fn is_upper(token: &str) -> bool {
    let mut cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Uppercase only after uncased characters, lowercase only after cased ones.
fn is_title(token: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in token.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

fn guess_role(tokens: &[&str], rules: &WorkRules) -> RoleGuess {
    let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let has = |markers: &[String]| lower.iter().any(|t| markers.contains(t));
    match (has(&rules.company_markers), has(&rules.position_markers)) {
        (true, false) => RoleGuess::Company,
        (false, true) => RoleGuess::Position,
        _ => RoleGuess::Unknown,
    }
}

/// Second pass: group candidates into records under `policy`.
pub fn pair(candidates: &[WorkCandidate], policy: PairingPolicy) -> Vec<WorkRecord> {
    match policy {
        PairingPolicy::Alternating => pair_alternating(candidates),
        PairingPolicy::RoleGuided
            if candidates.iter().all(|c| c.role == RoleGuess::Unknown) =>
        {
            pair_alternating(candidates)
        }
        PairingPolicy::RoleGuided => pair_role_guided(candidates),
    }
}

/// Entries 0, 2, 4… are companies and the entry after each is its position.
/// A trailing unpaired entry is dropped.
pub fn pair_alternating(candidates: &[WorkCandidate]) -> Vec<WorkRecord> {
    candidates
        .chunks_exact(2)
        .map(|pair| WorkRecord {
            company: pair[0].text(),
            position: pair[1].text(),
        })
        .collect()
}

/// Unknown lines take the opposite role of the line before them. A company
/// pairs with the next position; companies without a position and positions
/// without a company are dropped.
pub fn pair_role_guided(candidates: &[WorkCandidate]) -> Vec<WorkRecord> {
    let mut records = Vec::new();
    let mut previous: Option<RoleGuess> = None;
    let mut pending_company: Option<String> = None;

    for candidate in candidates {
        let role = match (candidate.role, previous) {
            (RoleGuess::Unknown, Some(RoleGuess::Company)) => RoleGuess::Position,
            (RoleGuess::Unknown, _) => RoleGuess::Company,
            (known, _) => known,
        };
        previous = Some(role);

        match role {
            RoleGuess::Position => {
                if let Some(company) = pending_company.take() {
                    records.push(WorkRecord {
                        company,
                        position: candidate.text(),
                    });
                }
            }
            _ => pending_company = Some(candidate.text()),
        }
    }
    records
}
