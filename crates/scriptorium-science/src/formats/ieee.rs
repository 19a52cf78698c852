use scriptorium_core::PaperWithAuthors;

/// Numbered IEEE-style references, one per line.
pub fn export_ieee(papers: &[PaperWithAuthors]) -> String {
    papers
        .iter()
        .enumerate()
        .map(|(idx, entry)| format_reference(idx + 1, entry))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_reference(number: usize, entry: &PaperWithAuthors) -> String {
    let paper = &entry.paper;
    let authors = if entry.authors.is_empty() {
        "Unknown".to_string()
    } else {
        entry.author_names().collect::<Vec<_>>().join(", ")
    };

    let mut parts = vec![format!("[{number}] {authors}"), format!("\"{},\"", paper.title)];
    if !paper.venue.is_empty() {
        parts.push(paper.venue.clone());
    }
    if let Some(year) = paper.year.filter(|y| *y != 0) {
        parts.push(year.to_string());
    }
    if let Some(doi) = paper.doi.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("doi:{doi}"));
    }

    format!("{}.", parts.join(" "))
}
