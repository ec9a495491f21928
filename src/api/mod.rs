pub mod format;

pub use format::{ClientDetail, ClientView, ProjectSummary, ProjectView};
