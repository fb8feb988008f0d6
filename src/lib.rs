use std::path::PathBuf;

pub mod error;
pub mod groups;
pub mod sorter;

pub use error::{GroupConfigError, SortError, SortResult};
pub use groups::{Coast, CoastGroups};
pub use sorter::{
    organize, sort_lines, split_record, InputSource, MalformedPolicy, SortConfig, SortSummary,
    SortedLines,
};

/// Runs one sort, loading coast membership from `groups_file` when given.
pub fn process_file(config: &SortConfig, groups_file: Option<PathBuf>) -> SortResult<SortSummary> {
    let groups = match groups_file {
        Some(path) => CoastGroups::from_json_file(&path)?,
        None => CoastGroups::default(),
    };
    organize(config, &groups)
}
