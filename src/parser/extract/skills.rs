use crate::parser::headings::Category;
use crate::parser::sections::SegmentedDocument;

/// Everything after the first `:` or `,` of each line, across all skills
/// blocks. The leading segment is treated as a label and dropped.
pub fn extract(doc: &SegmentedDocument<'_>) -> Vec<String> {
    doc.blocks(Category::Skills)
        .flat_map(|block| block.body())
        .flat_map(|(_, line)| line.trim().split([':', ',']).skip(1))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordTable;
    use crate::parser::sections::segment;

    fn run(lines: &[&str]) -> Vec<String> {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        let seg = segment(&lines, &KeywordTable::default()).unwrap();
        extract(&seg)
    }

    #[test]
    fn label_is_discarded() {
        let skills = run(&["Jane Doe", "SKILLS", "Languages: Python, Go, Rust"]);
        assert_eq!(skills, vec!["Python", "Go", "Rust"]);
    }

    #[test]
    fn fragments_are_trimmed_and_blanks_dropped() {
        let skills = run(&["Jane Doe", "SKILLS", "  Tools:  git ,, make , \n"]);
        assert_eq!(skills, vec!["git", "make"]);
    }

    #[test]
    fn comma_list_without_label_loses_first_item() {
        let skills = run(&["Jane Doe", "SKILLS", "Rust, Go, SQL"]);
        assert_eq!(skills, vec!["Go", "SQL"]);
    }

    #[test]
    fn lines_without_delimiters_yield_nothing() {
        let skills = run(&["Jane Doe", "SKILLS", "Strong communicator", "\n"]);
        assert!(skills.is_empty());
    }

    #[test]
    fn duplicates_kept_across_blocks() {
        let skills = run(&[
            "Jane Doe",
            "Technical Skills",
            "Languages: Rust, Go",
            "EXPERIENCE",
            "Acme Corp",
            "Core Competencies",
            "Backend: Rust",
        ]);
        assert_eq!(skills, vec!["Rust", "Go", "Rust"]);
    }
}
