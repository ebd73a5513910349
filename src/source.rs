use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_XML: &str = "word/document.xml";
const SUPPORTED: &[&str] = &["txt", "docx"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid docx XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("docx archive has no {DOCUMENT_XML}")]
    MissingDocumentXml,

    #[error("unsupported file type {0:?}, expected .txt or .docx")]
    UnsupportedFormat(String),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError + '_ {
    move |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SUPPORTED.contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Read a document as an ordered list of lines, picking the reader by extension.
pub fn read_lines(path: &Path) -> Result<Vec<String>, SourceError> {
    let lines = match extension(path).as_deref() {
        Some("txt") => read_text(path)?,
        Some("docx") => read_docx(path)?,
        other => return Err(SourceError::UnsupportedFormat(other.unwrap_or("").to_string())),
    };
    debug!(path = %path.display(), lines = lines.len(), "loaded document");
    Ok(lines)
}

/// Plain text. Each line keeps its trailing newline; bytes that are not
/// UTF-8 are replaced rather than rejected.
pub fn read_text(path: &Path) -> Result<Vec<String>, SourceError> {
    let bytes = fs::read(path).map_err(io_err(path))?;
    Ok(String::from_utf8_lossy(&bytes)
        .split_inclusive('\n')
        .map(str::to_string)
        .collect())
}

/// Word document. One line per paragraph, without newlines.
pub fn read_docx(path: &Path) -> Result<Vec<String>, SourceError> {
    let file = File::open(path).map_err(io_err(path))?;
    let mut archive = ZipArchive::new(file)?;
    let mut entry = match archive.by_name(DOCUMENT_XML) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Err(SourceError::MissingDocumentXml),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(io_err(path))?;
    docx_paragraphs(&xml)
}

/// Walk top-level `w:p` paragraphs, concatenating their `w:t` runs. Tabs and
/// breaks inside a paragraph become `\t` and `\n`. Paragraphs nested inside
/// a paragraph (text boxes) are skipped; the outer paragraph keeps its own text.
pub fn docx_paragraphs(xml: &str) -> Result<Vec<String>, SourceError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    depth += 1;
                    if depth == 1 {
                        current.clear();
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if depth == 0 => paragraphs.push(String::new()),
                b"tab" if depth == 1 => current.push('\t'),
                b"br" | b"cr" if depth == 1 => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text && depth == 1 => current.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    depth = depth.saturating_sub(1);
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}

/// Expand directories (non-recursively) into their supported files, sorted.
/// Plain file arguments are passed through untouched.
pub fn expand_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, SourceError> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .map_err(io_err(input))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_supported(p))
                .collect();
            found.sort();
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t>jane@mail.com</w:t><w:tab/><w:t>555-123-4567</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>SKILLS</w:t></w:r></w:p>
    <w:p><w:r><w:t>Languages: Rust &amp; Go</w:t><w:br/><w:t>more</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn write_docx(dir: &Path, name: &str, entry: &str, xml: &str) -> PathBuf {
        let path = dir.join(name);
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(entry, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn paragraphs_in_order() {
        let paragraphs = docx_paragraphs(BODY).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "Jane Doe",
                "jane@mail.com\t555-123-4567",
                "",
                "SKILLS",
                "Languages: Rust & Go\nmore",
            ]
        );
    }

    #[test]
    fn text_box_inside_paragraph_keeps_outer_text() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r><w:r><w:pict><v:shape xmlns:v="urn:schemas-microsoft-com:vml"><v:textbox><w:txbxContent><w:p><w:r><w:t>EXPERIENCE</w:t></w:r></w:p><w:p/></w:txbxContent></v:textbox></v:shape></w:pict></w:r><w:r><w:t xml:space="preserve"> Engineer</w:t></w:r></w:p>
    <w:p><w:r><w:t>SKILLS</w:t></w:r></w:p>
  </w:body></w:document>"#;
        let paragraphs = docx_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe Engineer", "SKILLS"]);
    }

    #[test]
    fn docx_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "cv.docx", DOCUMENT_XML, BODY);
        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Jane Doe");
    }

    #[test]
    fn docx_without_document_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "odd.docx", "word/other.xml", BODY);
        assert!(matches!(read_lines(&path), Err(SourceError::MissingDocumentXml)));
    }

    #[test]
    fn text_keeps_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        fs::write(&path, "Jane Doe\n\nSKILLS\nLanguages: Rust").unwrap();
        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["Jane Doe\n", "\n", "SKILLS\n", "Languages: Rust"]);
    }

    #[test]
    fn unsupported_extension() {
        let err = read_lines(Path::new("resume.pdf")).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat(ref ext) if ext == "pdf"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_lines(Path::new("/nonexistent/cv.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cv.txt"));
    }

    #[test]
    fn expand_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        fs::write(dir.path().join("a.TXT"), "x").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();
        let single = PathBuf::from("other.docx");

        let paths = expand_paths(&[dir.path().to_path_buf(), single.clone()]).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("a.TXT"), dir.path().join("b.txt"), single]
        );
    }
}
