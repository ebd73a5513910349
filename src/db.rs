use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

use crate::parser::extract::ParsedResume;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            id          INTEGER PRIMARY KEY,
            source      TEXT UNIQUE NOT NULL,
            email       TEXT NOT NULL,
            name        TEXT NOT NULL,
            phone       TEXT NOT NULL,
            line_count  INTEGER NOT NULL,
            parsed_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_documents_email ON documents(email);

        CREATE TABLE IF NOT EXISTS sections (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            category     TEXT NOT NULL,
            heading      TEXT NOT NULL,
            start_line   INTEGER NOT NULL,
            end_line     INTEGER NOT NULL,
            UNIQUE(document_id, start_line)
        );

        -- Extracted tables, keyed by the candidate email
        CREATE TABLE IF NOT EXISTS work_history (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            email        TEXT NOT NULL,
            position_idx INTEGER NOT NULL,
            company      TEXT NOT NULL,
            position     TEXT NOT NULL,
            UNIQUE(document_id, position_idx)
        );
        CREATE INDEX IF NOT EXISTS idx_work_email ON work_history(email);

        CREATE TABLE IF NOT EXISTS education (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            email        TEXT NOT NULL,
            kind         TEXT NOT NULL CHECK(kind IN ('university','degree')),
            position_idx INTEGER NOT NULL,
            value        TEXT NOT NULL,
            UNIQUE(document_id, kind, position_idx)
        );
        CREATE INDEX IF NOT EXISTS idx_education_email ON education(email);

        CREATE TABLE IF NOT EXISTS skills (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            email        TEXT NOT NULL,
            position_idx INTEGER NOT NULL,
            skill        TEXT NOT NULL,
            UNIQUE(document_id, position_idx)
        );
        CREATE INDEX IF NOT EXISTS idx_skills_email ON skills(email);
        ",
    )?;
    Ok(())
}

// ── Saving ──

/// Replace everything stored for each source in one transaction.
pub fn save_parsed(conn: &Connection, docs: &[(String, ParsedResume)]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut del = tx.prepare("DELETE FROM documents WHERE source = ?1")?;
        let mut d_stmt = tx.prepare(
            "INSERT INTO documents (source, email, name, phone, line_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut s_stmt = tx.prepare(
            "INSERT INTO sections (document_id, category, heading, start_line, end_line)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut w_stmt = tx.prepare(
            "INSERT INTO work_history (document_id, email, position_idx, company, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut e_stmt = tx.prepare(
            "INSERT INTO education (document_id, email, kind, position_idx, value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut k_stmt = tx.prepare(
            "INSERT INTO skills (document_id, email, position_idx, skill)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (source, r) in docs {
            del.execute([source])?;
            let c = &r.contact;
            d_stmt.execute(rusqlite::params![source, c.email, c.name, c.phone, r.line_count])?;
            let doc_id = tx.last_insert_rowid();
            let key = r.join_key();
            debug!(source = %source, doc_id, "saving document");

            for s in &r.sections {
                s_stmt.execute(rusqlite::params![
                    doc_id,
                    s.category.as_str(),
                    s.heading,
                    s.start,
                    s.end,
                ])?;
            }
            for (i, w) in r.work.iter().enumerate() {
                w_stmt.execute(rusqlite::params![doc_id, key, i, w.company, w.position])?;
            }
            for (i, u) in r.education.universities.iter().enumerate() {
                e_stmt.execute(rusqlite::params![doc_id, key, "university", i, u])?;
            }
            for (i, d) in r.education.degrees.iter().enumerate() {
                e_stmt.execute(rusqlite::params![doc_id, key, "degree", i, d])?;
            }
            for (i, skill) in r.skills.iter().enumerate() {
                k_stmt.execute(rusqlite::params![doc_id, key, i, skill])?;
            }
        }
    }
    tx.commit()?;
    Ok(docs.len())
}

// ── Overview ──

pub struct OverviewRow {
    pub source: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub jobs: usize,
    pub education: usize,
    pub skills: usize,
}

pub fn fetch_overview(
    conn: &Connection,
    email: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let where_clause = match email {
        Some(e) => {
            params.push(Box::new(e.to_string()));
            " WHERE d.email = ?1"
        }
        None => "",
    };

    let sql = format!(
        "SELECT d.source, d.name, d.email, d.phone,
                (SELECT COUNT(*) FROM work_history w WHERE w.document_id = d.id),
                (SELECT COUNT(*) FROM education e WHERE e.document_id = d.id),
                (SELECT COUNT(*) FROM skills s WHERE s.document_id = d.id)
         FROM documents d{}
         ORDER BY d.source
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(OverviewRow {
                source: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                jobs: row.get(4)?,
                education: row.get(5)?,
                skills: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub documents: usize,
    pub without_email: usize,
    pub sections: usize,
    pub jobs: usize,
    pub education: usize,
    pub skills: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };
    Ok(Stats {
        documents: count("SELECT COUNT(*) FROM documents")?,
        without_email: count("SELECT COUNT(*) FROM documents WHERE email = ''")?,
        sections: count("SELECT COUNT(*) FROM sections")?,
        jobs: count("SELECT COUNT(*) FROM work_history")?,
        education: count("SELECT COUNT(*) FROM education")?,
        skills: count("SELECT COUNT(*) FROM skills")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ResumeParser;

    fn parsed(lines: &[&str]) -> ParsedResume {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        ResumeParser::default().parse(&lines).unwrap()
    }

    fn jane() -> ParsedResume {
        parsed(&[
            "Jane Doe",
            "jane.doe@mail.com 555-123-4567",
            "EXPERIENCE",
            "Acme Corp",
            "Senior Engineer",
            "EDUCATION",
            "State University",
            "master of science",
            "SKILLS",
            "Languages: Python, Go, Rust",
        ])
    }

    #[test]
    fn save_and_overview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/resumes.sqlite");
        let conn = connect(path.to_str().unwrap()).unwrap();
        init_schema(&conn).unwrap();

        let no_email = parsed(&["John Roe", "SKILLS", "Tools: git"]);
        save_parsed(
            &conn,
            &[("jane.txt".to_string(), jane()), ("john.txt".to_string(), no_email)],
        )
        .unwrap();

        let rows = fetch_overview(&conn, None, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, "jane.txt");
        assert_eq!(rows[0].email, "jane.doe@mail.com");
        assert_eq!(rows[0].jobs, 1);
        assert_eq!(rows[0].education, 2);
        assert_eq!(rows[0].skills, 3);
        assert_eq!(rows[1].email, "");

        let only_jane = fetch_overview(&conn, Some("jane.doe@mail.com"), 10).unwrap();
        assert_eq!(only_jane.len(), 1);

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.documents, 2);
        assert_eq!(s.without_email, 1);
        assert_eq!(s.sections, 4);
        assert_eq!(s.skills, 4);
    }

    #[test]
    fn reimport_replaces_rows() {
        let conn = connect(":memory:").unwrap();
        init_schema(&conn).unwrap();
        save_parsed(&conn, &[("jane.txt".to_string(), jane())]).unwrap();
        save_parsed(&conn, &[("jane.txt".to_string(), jane())]).unwrap();

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.documents, 1);
        assert_eq!(s.jobs, 1);
        assert_eq!(s.skills, 3);
    }
}
