pub mod doi;

pub use doi::{Doi, detect_doi, find_dois};
