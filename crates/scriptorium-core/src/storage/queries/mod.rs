mod paper_search;

pub use paper_search::PaperSearchQuery;
