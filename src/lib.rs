pub mod config;
pub mod db;
pub mod parser;
pub mod report;
pub mod source;

pub use config::{ParserConfig, Settings};
pub use parser::extract::ParsedResume;
pub use parser::{ParseError, ResumeParser};
