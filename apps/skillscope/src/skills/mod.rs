pub mod handlers;
pub mod normalize;
pub mod table;

use std::path::Path;

use normalize::{SynonymMap, SynonymMapError};

/// The synonym table at `path`, or the embedded one when no path is configured.
pub fn load_synonyms(path: Option<&Path>) -> Result<SynonymMap, SynonymMapError> {
    match path {
        Some(path) => SynonymMap::from_path(path),
        None => SynonymMap::embedded(),
    }
}
