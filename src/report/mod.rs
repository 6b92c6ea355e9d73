/// Automated profiling of a whole dataset.
///
/// `profile` computes the report; `html` renders it as a standalone page.
/// The in-window rendering lives in `ui::report`.
pub mod html;
pub mod profile;

pub use profile::ProfileReport;
