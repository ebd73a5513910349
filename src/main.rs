use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use resume_parser::report::{self, JsonReport};
use resume_parser::{db, source, ParsedResume, ResumeParser, Settings};

#[derive(Parser)]
#[command(name = "resume_parser", about = "Keyword-based resume parser")]
struct Cli {
    /// Settings file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse documents and print the contact, work, education and skills tables
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Show the section index of one document
    Sections { file: PathBuf },
    /// Parse documents (or directories of them) into the SQLite store
    Import {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Max documents to import
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Stored documents table
    Overview {
        /// Filter by email
        #[arg(short, long)]
        email: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let parser = ResumeParser::new(settings.parser.clone());

    let result = match cli.command {
        Commands::Parse { files, json } => {
            let parsed = files
                .iter()
                .map(|path| Ok((path.display().to_string(), parse_file(&parser, path)?)))
                .collect::<anyhow::Result<Vec<_>>>()?;

            if json {
                let now = chrono::Utc::now();
                let reports: Vec<_> = parsed
                    .iter()
                    .map(|(src, r)| JsonReport::new(src, r, now))
                    .collect();
                println!("{}", report::render_json(&reports)?);
            } else {
                for (src, r) in &parsed {
                    println!("{}", report::render_tables(src, r));
                }
            }
            Ok(())
        }
        Commands::Sections { file } => {
            let r = parse_file(&parser, &file)?;
            print!("{}", report::render_sections(&file.display().to_string(), &r));
            Ok(())
        }
        Commands::Import { paths, limit } => {
            let mut files = source::expand_paths(&paths)?;
            if let Some(n) = limit {
                files.truncate(n);
            }
            if files.is_empty() {
                println!("No .txt or .docx documents found.");
                return Ok(());
            }

            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Importing {} documents...", files.len());
            let counts = import_files(&conn, &parser, &files, settings.chunk_size)?;
            counts.print();
            Ok(())
        }
        Commands::Overview { email, limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, email.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No documents found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<24} | {:<20} | {:<28} | {:<16} | {:>4} | {:>4} | {:>6}",
                "#", "Source", "Name", "Email", "Phone", "Jobs", "Edu", "Skills"
            );
            println!("{}", "-".repeat(124));

            for (i, r) in rows.iter().enumerate() {
                let email = if r.email.is_empty() { "-" } else { &r.email };
                println!(
                    "{:>3} | {:<24} | {:<20} | {:<28} | {:<16} | {:>4} | {:>4} | {:>6}",
                    i + 1,
                    report::truncate(&r.source, 24),
                    report::truncate(&r.name, 20),
                    report::truncate(email, 28),
                    report::truncate(&r.phone, 16),
                    r.jobs,
                    r.education,
                    r.skills
                );
            }

            println!("\n{} documents", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Documents:     {}", s.documents);
            println!("Without email: {}", s.without_email);
            println!("Sections:      {}", s.sections);
            println!("Jobs:          {}", s.jobs);
            println!("Education:     {}", s.education);
            println!("Skills:        {}", s.skills);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn parse_file(parser: &ResumeParser, path: &Path) -> anyhow::Result<ParsedResume> {
    let lines = source::read_lines(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parser
        .parse(&lines)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

struct ImportCounts {
    documents: usize,
    failed: usize,
    jobs: usize,
    education: usize,
    skills: usize,
}

impl ImportCounts {
    fn print(&self) {
        println!(
            "Saved {} documents ({} failed), {} jobs, {} education entries, {} skills.",
            self.documents, self.failed, self.jobs, self.education, self.skills,
        );
    }
}

fn import_files(
    conn: &rusqlite::Connection,
    parser: &ResumeParser,
    files: &[PathBuf],
    chunk_size: usize,
) -> anyhow::Result<ImportCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ImportCounts {
        documents: 0,
        failed: 0,
        jobs: 0,
        education: 0,
        skills: 0,
    };

    for chunk in files.chunks(chunk_size) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| (path, parse_file(parser, path)))
            .collect();

        let mut parsed = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(r) => {
                    counts.jobs += r.work.len();
                    counts.education += r.education.universities.len() + r.education.degrees.len();
                    counts.skills += r.skills.len();
                    parsed.push((path.display().to_string(), r));
                }
                Err(e) => {
                    counts.failed += 1;
                    pb.suspend(|| warn!(path = %path.display(), "skipped: {:#}", e));
                }
            }
        }

        counts.documents += db::save_parsed(conn, &parsed)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        documents = counts.documents,
        failed = counts.failed,
        "import finished"
    );
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
