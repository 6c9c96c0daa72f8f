//! Programming languages offered for conversion.
//!
//! - `catalog`: the fixed, sorted list of language names and its search filter
//! - `picker`: search-as-you-type selection state for one language dropdown

mod catalog;
mod picker;

pub use catalog::{LanguageCatalog, DEFAULT_LANGUAGES};
pub use picker::LanguagePicker;
