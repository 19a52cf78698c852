use scriptorium_core::PaperWithAuthors;

pub fn export_markdown(papers: &[PaperWithAuthors]) -> String {
    let mut lines = vec!["# Research Library\n".to_string()];

    for entry in papers {
        let paper = &entry.paper;
        let title = if paper.title.is_empty() {
            "(untitled)"
        } else {
            paper.title.as_str()
        };
        let mut line = format!("- **{title}**");

        let mut meta = Vec::new();
        if let Some(year) = paper.year.filter(|y| *y != 0) {
            meta.push(year.to_string());
        }
        if !paper.venue.is_empty() {
            meta.push(paper.venue.clone());
        }
        if let Some(doi) = paper.doi.as_deref().filter(|d| !d.is_empty()) {
            meta.push(format!("DOI: `{doi}`"));
        }
        if !meta.is_empty() {
            line.push_str(" \u{2014} ");
            line.push_str(&meta.join(" \u{2022} "));
        }

        lines.push(line);
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptorium_core::Paper;

    #[test]
    fn bullets_carry_available_metadata() {
        let mut full = Paper::new("Attention Is All You Need");
        full.year = Some(2017);
        full.venue = "NeurIPS".into();
        full.doi = Some("10.5555/3295222".into());
        let bare = Paper::new("");

        let md = export_markdown(&[
            PaperWithAuthors::new(full, vec![]),
            PaperWithAuthors::new(bare, vec![]),
        ]);
        assert_eq!(
            md,
            "# Research Library\n\n\
             - **Attention Is All You Need** \u{2014} 2017 \u{2022} NeurIPS \u{2022} DOI: `10.5555/3295222`\n\
             - **(untitled)**\n"
        );
    }
}
