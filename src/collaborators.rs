//! Production collaborator implementations
//!
//! Thin HTTP clients behind the traits in `runtime::traits`.

mod drug_info;
mod places;
mod summary;

pub use drug_info::PmdaDrugLookup;
pub use places::{GooglePlacesService, UnconfiguredFacilitySearch};
pub use summary::OpenAiSummaryService;
