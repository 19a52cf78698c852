use scriptorium_core::PaperWithAuthors;

const HEADER: [&str; 6] = ["paper_id", "title", "authors", "year", "venue", "doi"];

/// RFC 4180 style CSV with CRLF line endings. Fields are quoted only when
/// they contain a comma, a quote or a line break.
pub fn export_csv(papers: &[PaperWithAuthors]) -> String {
    let mut out = String::new();
    write_row(&mut out, HEADER.iter().copied());

    for entry in papers {
        let paper = &entry.paper;
        let authors = entry.author_names().collect::<Vec<_>>().join("; ");
        let year = paper
            .year
            .filter(|y| *y != 0)
            .map(|y| y.to_string())
            .unwrap_or_default();
        let doi = paper.doi.as_deref().unwrap_or("");

        write_row(
            &mut out,
            [
                paper.id.as_str(),
                paper.title.as_str(),
                authors.as_str(),
                year.as_str(),
                paper.venue.as_str(),
                doi,
            ],
        );
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (idx, field) in fields.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&quote_field(field));
    }
    out.push_str("\r\n");
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
