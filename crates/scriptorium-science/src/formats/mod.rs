//! Whole-library exports.

pub mod bibtex;
pub mod csv;
pub mod ieee;
pub mod markdown;

use std::fmt;
use std::str::FromStr;

use scriptorium_core::{Database, PaperWithAuthors, ScriptoriumError};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Bibtex,
    Ieee,
    Markdown,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Bibtex, Self::Ieee, Self::Markdown, Self::Csv];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bibtex => "bibtex",
            Self::Ieee => "ieee",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
        }
    }

    pub fn render(&self, papers: &[PaperWithAuthors]) -> String {
        match self {
            Self::Bibtex => bibtex::export_bibtex(papers),
            Self::Ieee => ieee::export_ieee(papers),
            Self::Markdown => markdown::export_markdown(papers),
            Self::Csv => csv::export_csv(papers),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ScriptoriumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bibtex" | "bib" => Ok(Self::Bibtex),
            "ieee" => Ok(Self::Ieee),
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            other => Err(ScriptoriumError::InvalidArgument(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

/// Render every stored paper, in insertion order.
pub fn export_library(db: &Database, format: ExportFormat) -> Result<String> {
    let papers = db.list_papers_with_authors()?;
    Ok(format.render(&papers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_round_trip_through_from_str() {
        for format in ExportFormat::ALL {
            assert_eq!(format.name().parse::<ExportFormat>().unwrap(), format);
        }
        assert_eq!("BIB".parse::<ExportFormat>().unwrap(), ExportFormat::Bibtex);
        assert!(matches!(
            "ris".parse::<ExportFormat>(),
            Err(ScriptoriumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_library_exports() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(export_library(&db, ExportFormat::Bibtex).unwrap(), "");
        assert_eq!(
            export_library(&db, ExportFormat::Markdown).unwrap(),
            "# Research Library\n\n"
        );
        assert_eq!(
            export_library(&db, ExportFormat::Csv).unwrap(),
            "paper_id,title,authors,year,venue,doi\r\n"
        );
    }
}
