//! Where a task line came from.

use std::path::Path;

/// Identifies the origin of a task line within the host's documents.
///
/// Locations are immutable; re-scanning a file produces fresh tasks with
/// fresh locations. `section_start` is the line number of the section the
/// task belongs to, and `section_index` its position among the tasks of
/// that section - together they let hosts replace blocks of lines safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    path: String,
    line_number: usize,
    section_start: usize,
    section_index: usize,
    preceding_header: Option<String>,
}

impl TaskLocation {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        line_number: usize,
        section_start: usize,
        section_index: usize,
        preceding_header: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line_number,
            section_start,
            section_index,
            preceding_header,
        }
    }

    /// A location for contexts where the origin is unknown, e.g. tasks
    /// constructed programmatically in tests.
    #[must_use]
    pub fn from_unknown_position(path: impl Into<String>) -> Self {
        Self::new(path, 0, 0, 0, None)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn section_start(&self) -> usize {
        self.section_start
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn preceding_header(&self) -> Option<&str> {
        self.preceding_header.as_deref()
    }

    /// File name with the `.md` extension removed, if the path has one.
    pub fn filename(&self) -> Option<String> {
        let name = Path::new(&self.path).file_name()?.to_str()?;
        name.strip_suffix(".md").map(str::to_string)
    }

    /// The folder part of the path, with a trailing slash; `/` for files at
    /// the vault root.
    pub fn folder(&self) -> String {
        match self.path.rfind('/') {
            Some(index) => self.path[..=index].to_string(),
            None => "/".to_string(),
        }
    }

    /// The top-level folder of the path, `/` for files at the vault root.
    pub fn root(&self) -> String {
        match self.path.find('/') {
            Some(index) => self.path[..=index].to_string(),
            None => "/".to_string(),
        }
    }

    /// Copy this location with a different line-position triple, keeping the
    /// path and header. Used by hosts when lines move within a file.
    #[must_use]
    pub fn with_position(
        &self,
        line_number: usize,
        section_start: usize,
        section_index: usize,
    ) -> Self {
        Self {
            path: self.path.clone(),
            line_number,
            section_start,
            section_index,
            preceding_header: self.preceding_header.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_strips_md_extension() {
        let location = TaskLocation::from_unknown_position("work/projects/roadmap.md");
        assert_eq!(location.filename(), Some("roadmap".to_string()));
    }

    #[test]
    fn test_filename_requires_md_extension() {
        let location = TaskLocation::from_unknown_position("work/notes.txt");
        assert_eq!(location.filename(), None);
    }

    #[test]
    fn test_folder_and_root() {
        let location = TaskLocation::from_unknown_position("work/projects/roadmap.md");
        assert_eq!(location.folder(), "work/projects/");
        assert_eq!(location.root(), "work/");

        let top_level = TaskLocation::from_unknown_position("inbox.md");
        assert_eq!(top_level.folder(), "/");
        assert_eq!(top_level.root(), "/");
    }

    #[test]
    fn test_with_position_keeps_path_and_header() {
        let location = TaskLocation::new("a.md", 3, 1, 0, Some("## Todo".to_string()));
        let moved = location.with_position(10, 8, 1);
        assert_eq!(moved.path(), "a.md");
        assert_eq!(moved.preceding_header(), Some("## Todo"));
        assert_eq!(moved.line_number(), 10);
        assert_eq!(moved.section_start(), 8);
        assert_eq!(moved.section_index(), 1);
    }
}
