//! File attachments selected for the next message.

use serde::{Deserialize, Serialize};

/// A file chosen through the picker, the clipboard, or a drop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Original filename
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Last-modified timestamp (milliseconds since the Unix epoch)
    pub last_modified: i64,
    /// MIME type of the file
    pub mime_type: String,
    /// Raw file contents
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Identity used for de-duplication: two files with the same name, size and
/// last-modified time are the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub name: String,
    pub size: u64,
    pub last_modified: i64,
}

impl FileAttachment {
    /// Creates an attachment from in-memory bytes; `size` is taken from the data.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        last_modified: i64,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            last_modified,
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn key(&self) -> FileKey {
        FileKey {
            name: self.name.clone(),
            size: self.size,
            last_modified: self.last_modified,
        }
    }
}

/// Ordered, de-duplicated set of files waiting to be sent.
#[derive(Debug, Clone, Default)]
pub struct SelectedFiles {
    files: Vec<FileAttachment>,
}

impl SelectedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends files not already present, preserving arrival order.
    ///
    /// Duplicates inside `incoming` itself are collapsed too. Returns the number
    /// of files actually added.
    pub fn merge<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = FileAttachment>,
    {
        let mut added = 0;
        for file in incoming {
            let key = file.key();
            if self.files.iter().any(|existing| existing.key() == key) {
                continue;
            }
            self.files.push(file);
            added += 1;
        }
        added
    }

    /// Removes the file at `index`, returning it if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<FileAttachment> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileAttachment> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[FileAttachment] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize, modified: i64) -> FileAttachment {
        FileAttachment::from_bytes(name, "text/plain", modified, vec![b'x'; size])
    }

    #[test]
    fn test_merge_skips_identical_triple() {
        let mut files = SelectedFiles::new();
        assert_eq!(files.merge(vec![file("a.txt", 3, 10)]), 1);
        assert_eq!(files.merge(vec![file("a.txt", 3, 10)]), 0);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_merge_collapses_duplicates_within_one_batch() {
        let mut files = SelectedFiles::new();
        let added = files.merge(vec![
            file("a.txt", 3, 10),
            file("a.txt", 3, 10),
            file("b.txt", 3, 10),
        ]);
        assert_eq!(added, 2);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_merge_keeps_files_differing_in_any_key_field() {
        let mut files = SelectedFiles::new();
        files.merge(vec![
            file("a.txt", 3, 10),
            file("a.txt", 4, 10),
            file("a.txt", 3, 11),
            file("b.txt", 3, 10),
        ]);
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut files = SelectedFiles::new();
        files.merge(vec![file("a.txt", 1, 1)]);
        assert!(files.remove(5).is_none());
        assert_eq!(files.remove(0).map(|f| f.name), Some("a.txt".to_string()));
        assert!(files.is_empty());
    }
}
