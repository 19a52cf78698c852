use scriptorium_core::PaperWithAuthors;

/// One `@article` entry per paper, separated by blank lines.
pub fn export_bibtex(papers: &[PaperWithAuthors]) -> String {
    papers
        .iter()
        .map(generate_bibtex)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn generate_bibtex(entry: &PaperWithAuthors) -> String {
    let paper = &entry.paper;

    let authors = if entry.authors.is_empty() {
        "Unknown".to_string()
    } else {
        entry.author_names().collect::<Vec<_>>().join(" and ")
    };

    let mut fields = vec![
        format!("  title = {{{}}}", escape_bibtex(&paper.title)),
        format!("  author = {{{}}}", escape_bibtex(&authors)),
    ];
    if let Some(year) = paper.year.filter(|y| *y != 0) {
        fields.push(format!("  year = {{{year}}}"));
    }
    if !paper.venue.is_empty() {
        fields.push(format!("  journal = {{{}}}", escape_bibtex(&paper.venue)));
    }
    if let Some(doi) = paper.doi.as_deref().filter(|d| !d.is_empty()) {
        fields.push(format!("  doi = {{{doi}}}"));
    }

    format!("@article{{{},\n{}\n}}", cite_key(&paper.id), fields.join(",\n"))
}

/// Paper ids are used as keys; `:` and `/` are not allowed in BibTeX keys.
fn cite_key(id: &str) -> String {
    if id.is_empty() {
        return "paper".to_string();
    }
    id.replace([':', '/'], "_")
}

fn escape_bibtex(s: &str) -> String {
    s.replace('&', "\\&")
        .replace('_', "\\_")
        .replace('$', "\\$")
        .replace('%', "\\%")
        .replace('#', "\\#")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptorium_core::{Author, Paper};

    #[test]
    fn test_generate_bibtex() {
        let mut paper = Paper::new("Attention Is All You Need");
        paper.id = "urn:paper/42".to_string();
        paper.year = Some(2017);
        paper.venue = "NeurIPS".to_string();
        paper.doi = Some("10.5555/3295222.3295349".to_string());
        let authors = vec![
            Author { id: 1, name: "Ashish Vaswani".into(), orcid: None },
            Author { id: 2, name: "Noam Shazeer".into(), orcid: None },
        ];

        let bib = generate_bibtex(&PaperWithAuthors::new(paper, authors));
        assert_eq!(
            bib,
            "@article{urn_paper_42,\n  title = {Attention Is All You Need},\n  \
             author = {Ashish Vaswani and Noam Shazeer},\n  year = {2017},\n  \
             journal = {NeurIPS},\n  doi = {10.5555/3295222.3295349}\n}"
        );
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let mut paper = Paper::new("Costs & Benefits");
        paper.id = "p1".to_string();
        let bib = generate_bibtex(&PaperWithAuthors::new(paper, vec![]));
        assert_eq!(
            bib,
            "@article{p1,\n  title = {Costs \\& Benefits},\n  author = {Unknown}\n}"
        );
    }
}
