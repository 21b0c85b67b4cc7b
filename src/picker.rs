//! Terminal file picker restricted to image files.
//!
//! Stands in for a native "choose file" dialog: lists one directory at a
//! time, showing subdirectories and files with image extensions.

use std::path::{Path, PathBuf};

use crate::chat::ingest::is_image_path;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Picker state: a directory listing plus a selection cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePicker {
    pub dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub selected: usize,
}

impl FilePicker {
    pub fn new(dir: PathBuf, entries: Vec<PickerEntry>) -> Self {
        Self {
            dir,
            entries,
            selected: 0,
        }
    }

    pub fn selected_entry(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    pub fn parent_dir(&self) -> Option<PathBuf> {
        self.dir.parent().map(Path::to_path_buf)
    }
}

/// List `dir`: subdirectories first, then image files, each sorted by name.
/// Hidden entries are skipped.
pub fn list_dir(dir: &Path) -> Result<Vec<PickerEntry>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Follows symlinks, so a link to a directory is browsable.
        if path.is_dir() {
            dirs.push(PickerEntry {
                name,
                path,
                is_dir: true,
            });
        } else if is_image_path(&path) {
            files.push(PickerEntry {
                name,
                path,
                is_dir: false,
            });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    Ok(dirs)
}
