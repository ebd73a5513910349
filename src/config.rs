use std::path::Path;

use anyhow::{Context, Result};
use config::Config;
use serde::{Deserialize, Serialize};

use crate::parser::headings::Category;

const ENV_PREFIX: &str = "RESUME";

/// Runtime settings for the CLI driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: String,
    /// Documents parsed per rayon batch before each SQLite commit.
    pub chunk_size: usize,
    pub parser: ParserConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: "data/resumes.sqlite".to_string(),
            chunk_size: 200,
            parser: ParserConfig::default(),
        }
    }
}

impl Settings {
    /// Layer an optional settings file and `RESUME_*` environment variables
    /// over the built-in defaults.
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if settings.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        Ok(settings)
    }
}

/// Heading keywords per category. Matching order is fixed by
/// `Category::PRIORITY`, never by the order fields appear in a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub summary: Vec<String>,
    pub experience: Vec<String>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub accomplishments: Vec<String>,
    pub extra_activity: Vec<String>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable {
            summary: words(&["summary", "summery", "objective", "career"]),
            experience: words(&["experience", "background", "employment"]),
            skills: words(&["skills", "qualifications", "knowledge", "competencies"]),
            education: words(&["education", "academic"]),
            accomplishments: words(&["projects", "publications"]),
            extra_activity: words(&["interests", "intrests", "volunteer", "honors"]),
        }
    }
}

impl KeywordTable {
    pub fn keywords(&self, category: Category) -> &[String] {
        match category {
            Category::Summary => &self.summary,
            Category::Experience => &self.experience,
            Category::Skills => &self.skills,
            Category::Education => &self.education,
            Category::Accomplishments => &self.accomplishments,
            Category::ExtraActivity => &self.extra_activity,
            Category::ContactInfo => &[],
        }
    }
}

/// How work-history candidate lines are grouped into (company, position) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Even entries are companies, odd entries are positions.
    Alternating,
    /// Use marker words when any line carries one, else fall back to `Alternating`.
    #[default]
    RoleGuided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRules {
    pub pairing: PairingPolicy,
    pub company_markers: Vec<String>,
    pub position_markers: Vec<String>,
}

impl Default for WorkRules {
    fn default() -> Self {
        WorkRules {
            pairing: PairingPolicy::default(),
            company_markers: words(&[
                "inc", "inc.", "corp", "corp.", "corporation", "llc", "ltd", "ltd.", "gmbh",
                "co.", "company", "group", "technologies", "solutions", "labs", "systems",
                "bank", "agency", "partners",
            ]),
            position_markers: words(&[
                "engineer", "developer", "manager", "director", "intern", "analyst",
                "consultant", "lead", "architect", "designer", "administrator", "scientist",
                "specialist", "officer", "assistant", "associate", "coordinator", "president",
                "head", "cto", "ceo", "cfo", "vp",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRules {
    pub university_keyword: String,
    pub degree_keywords: Vec<String>,
    /// Leading tokens removed before classification (mis-decoded bullets).
    pub bullet_artifacts: Vec<String>,
}

impl Default for EducationRules {
    fn default() -> Self {
        EducationRules {
            university_keyword: "university".to_string(),
            degree_keywords: words(&["master", "bachelor", "doctorate"]),
            bullet_artifacts: words(&["â€¢", "•", "·", "*"]),
        }
    }
}

/// Everything the parsing core needs. Built once and shared read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub keywords: KeywordTable,
    pub work: WorkRules,
    pub education: EducationRules,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let s = Settings::load(None).unwrap();
        assert_eq!(s.chunk_size, 200);
        assert!(s.parser.keywords.experience.contains(&"employment".to_string()));
        assert_eq!(s.parser.work.pairing, PairingPolicy::RoleGuided);
    }

    #[test]
    fn file_overrides_keywords_and_keeps_other_defaults() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            "db_path = \"/tmp/other.sqlite\"\n\n[parser.keywords]\nskills = [\"tooling\"]\n\n[parser.work]\npairing = \"alternating\""
        )
        .unwrap();

        let s = Settings::load(Some(f.path())).unwrap();
        assert_eq!(s.db_path, "/tmp/other.sqlite");
        assert_eq!(s.parser.keywords.skills, vec!["tooling".to_string()]);
        assert_eq!(s.parser.keywords.education, KeywordTable::default().education);
        assert_eq!(s.parser.work.pairing, PairingPolicy::Alternating);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/resume.toml"))).is_err());
    }

    #[test]
    fn contact_category_has_no_keywords() {
        let table = KeywordTable::default();
        assert!(table.keywords(Category::ContactInfo).is_empty());
        assert_eq!(table.keywords(Category::Education), ["education", "academic"]);
    }
}
