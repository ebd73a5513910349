pub mod extract;
pub mod headings;
pub mod sections;

use thiserror::Error;

use crate::config::ParserConfig;
use extract::contact::ContactExtractor;
use extract::ParsedResume;

/// Fatal conditions. Missing phone or email is not one of them.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no section heading found in {line_count} lines, the document cannot be segmented")]
    NoHeadings { line_count: usize },

    #[error("malformed contact line {line:?}: {reason}")]
    MalformedContact { line: String, reason: &'static str },
}

/// Parses one document at a time; holds no per-document state.
pub struct ResumeParser {
    config: ParserConfig,
    contact: ContactExtractor,
}

impl ResumeParser {
    pub fn new(config: ParserConfig) -> Self {
        ResumeParser {
            config,
            contact: ContactExtractor::default(),
        }
    }

    /// Swap the phone/email detection strategies.
    pub fn with_contact_extractor(mut self, contact: ContactExtractor) -> Self {
        self.contact = contact;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Three-pass pipeline: lines → sections → extracted records.
    pub fn parse(&self, lines: &[String]) -> Result<ParsedResume, ParseError> {
        let doc = sections::segment(lines, &self.config.keywords)?;
        extract::extract_all(&doc, &self.config, &self.contact)
    }
}

impl Default for ResumeParser {
    fn default() -> Self {
        ResumeParser::new(ParserConfig::default())
    }
}
