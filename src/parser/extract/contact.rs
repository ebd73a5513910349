use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::parser::ParseError;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+\d{1,2}[\s.-])?\(?\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^@|\s]+@[^@]+\.[^@|\s]+").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Finds a single field in the joined contact text.
pub trait FieldMatcher: Send + Sync {
    fn find(&self, text: &str) -> Option<String>;
}

/// North-American style numbers with an optional country code.
pub struct PhonePattern;

impl FieldMatcher for PhonePattern {
    fn find(&self, text: &str) -> Option<String> {
        PHONE_RE.find(text).map(|m| m.as_str().to_string())
    }
}

/// The email match is cut at the first whitespace and stripped of `;`.
pub struct EmailPattern;

impl FieldMatcher for EmailPattern {
    fn find(&self, text: &str) -> Option<String> {
        EMAIL_RE
            .find(text)
            .and_then(|m| m.as_str().split_whitespace().next())
            .map(|e| e.trim_matches(';').to_string())
            .filter(|e| !e.is_empty())
    }
}

/// First match of an arbitrary pattern.
pub struct RegexMatcher {
    re: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(RegexMatcher {
            re: Regex::new(pattern)?,
        })
    }
}

impl FieldMatcher for RegexMatcher {
    fn find(&self, text: &str) -> Option<String> {
        self.re.find(text).map(|m| m.as_str().to_string())
    }
}

pub struct ContactExtractor {
    phone: Box<dyn FieldMatcher>,
    email: Box<dyn FieldMatcher>,
}

impl Default for ContactExtractor {
    fn default() -> Self {
        ContactExtractor {
            phone: Box::new(PhonePattern),
            email: Box::new(EmailPattern),
        }
    }
}

impl ContactExtractor {
    pub fn with_phone(mut self, matcher: impl FieldMatcher + 'static) -> Self {
        self.phone = Box::new(matcher);
        self
    }

    pub fn with_email(mut self, matcher: impl FieldMatcher + 'static) -> Self {
        self.email = Box::new(matcher);
        self
    }

    /// Name comes from the first two tokens of the first line; phone and
    /// email default to empty strings when absent.
    pub fn extract(&self, block: &[String]) -> Result<ContactRecord, ParseError> {
        let first = block.first().ok_or_else(|| ParseError::MalformedContact {
            line: String::new(),
            reason: "no lines before the first heading",
        })?;

        let mut tokens = first.split_whitespace();
        let name = match (tokens.next(), tokens.next()) {
            (Some(given), Some(family)) => format!("{} {}", given, family),
            _ => {
                return Err(ParseError::MalformedContact {
                    line: first.trim_end().to_string(),
                    reason: "expected a given name and a family name",
                })
            }
        };

        let text = block.join(" ");
        Ok(ContactRecord {
            name,
            email: self.email.find(&text).unwrap_or_default(),
            phone: self.phone.find(&text).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn phone_formats() {
        for (text, expected) in [
            ("call 555-123-4567 now", "555-123-4567"),
            ("(555) 123-4567", "(555) 123-4567"),
            ("+44 555.123.4567", "+44 555.123.4567"),
            ("+1 (415) 555-0199", "+1 (415) 555-0199"),
            ("555 123 4567", "555 123 4567"),
        ] {
            assert_eq!(PhonePattern.find(text).as_deref(), Some(expected), "{text}");
        }
        assert!(PhonePattern.find("5551234567").is_none());
        assert!(PhonePattern.find("no digits here").is_none());
    }

    #[test]
    fn email_is_cut_at_whitespace_and_semicolons() {
        assert_eq!(
            EmailPattern.find("Jane Doe jane.doe@mail.com 555-123-4567").as_deref(),
            Some("jane.doe@mail.com")
        );
        assert_eq!(
            EmailPattern.find("mail: jane@corp.io; phone").as_deref(),
            Some("jane@corp.io")
        );
        assert!(EmailPattern.find("no address here").is_none());
        assert!(EmailPattern.find("user@localhost").is_none());
    }

    #[test]
    fn name_from_first_two_tokens() {
        let c = ContactExtractor::default()
            .extract(&block(&["  Mary Ann Smith\n", "mary@x.org\n"]))
            .unwrap();
        assert_eq!(c.name, "Mary Ann");
        assert_eq!(c.email, "mary@x.org");
        assert_eq!(c.phone, "");
    }

    #[test]
    fn empty_block_is_malformed() {
        let err = ContactExtractor::default().extract(&[]).unwrap_err();
        assert!(matches!(err, ParseError::MalformedContact { .. }));
    }

    #[test]
    fn blank_first_line_is_malformed() {
        let err = ContactExtractor::default()
            .extract(&block(&["\n", "Jane Doe"]))
            .unwrap_err();
        assert!(err.to_string().contains("given name"));
    }

    #[test]
    fn custom_phone_strategy() {
        let extractor = ContactExtractor::default()
            .with_phone(RegexMatcher::new(r"\d{2} \d{2} \d{2} \d{2} \d{2}").unwrap());
        let c = extractor
            .extract(&block(&["Jean Dupont", "01 23 45 67 89 jean@exemple.fr"]))
            .unwrap();
        assert_eq!(c.phone, "01 23 45 67 89");
        assert_eq!(c.email, "jean@exemple.fr");
    }
}
