pub mod author;
pub mod file;
pub mod paper;
pub mod project;
pub mod tag;

pub use author::*;
pub use file::*;
pub use paper::*;
pub use project::*;
pub use tag::*;
