mod filter;
mod load;
mod problem;
mod raw;
mod section;
mod term;

pub use filter::{available_terms, SectionFilter};
pub use load::{load_sections, LoadedSections};
pub use problem::LoadProblem;
pub use section::EnsembleSection;
pub use term::{compare_terms, term_key};
