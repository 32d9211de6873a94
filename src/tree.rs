//! In-memory resource tree
//!
//! The tree models the virtual layout of embedded resources: folders,
//! files, and key/value metadata. It is populated during manifest
//! ingestion, frozen, and then handed to the code generator.
//!
//! All nodes live in arenas owned by [`ResourceTree`]; [`FolderId`] and
//! [`FileId`] are cheap copyable handles. Parent links are ids rather than
//! references, so navigation works in both directions without shared
//! ownership.

use crate::error::{CresError, Result};
use std::fs;
use tracing::debug;

/// Handle to a folder node within a [`ResourceTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub(crate) usize);

/// Handle to a file node within a [`ResourceTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub(crate) usize);

/// One key/value metadata pair
///
/// Keys are not deduplicated; lookup returns the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// Embedded file entry
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Filename only (e.g. "icon.png")
    pub name: String,
    /// Full virtual path (e.g. "images/icon.png")
    pub path: String,
    /// Where the bytes come from, if the file is backed by disk
    pub source_path: Option<String>,
    /// Media type (e.g. "image/png")
    pub mime: String,
    /// File content; `None` until loaded, may be empty once loaded
    pub data: Option<Vec<u8>>,
    pub metadata: Vec<MetadataEntry>,
    pub parent: FolderId,
}

impl FileNode {
    /// Size of the loaded content in bytes (0 if not loaded)
    pub fn size(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }
}

/// Virtual folder
#[derive(Debug, Clone)]
pub struct FolderNode {
    /// Folder name only (empty for the root)
    pub name: String,
    /// Full virtual path (empty for the root)
    pub path: String,
    /// Parent folder (`None` only for the root)
    pub parent: Option<FolderId>,
    /// Child folders in insertion order
    pub children: Vec<FolderId>,
    /// Files in insertion order
    pub files: Vec<FileId>,
    pub metadata: Vec<MetadataEntry>,
}

/// First-match metadata lookup
pub fn metadata_value<'a>(list: &'a [MetadataEntry], key: &str) -> Option<&'a str> {
    list.iter()
        .find(|m| m.key == key)
        .map(|m| m.value.as_str())
}

/// Owning arena for all folder and file nodes of one resource tree
#[derive(Debug)]
pub struct ResourceTree {
    folders: Vec<FolderNode>,
    files: Vec<FileNode>,
}

impl ResourceTree {
    /// Create a tree containing only the root folder
    pub fn new() -> Self {
        Self {
            folders: vec![FolderNode {
                name: String::new(),
                path: String::new(),
                parent: None,
                children: Vec::new(),
                files: Vec::new(),
                metadata: Vec::new(),
            }],
            files: Vec::new(),
        }
    }

    /// The root folder id
    pub fn root(&self) -> FolderId {
        FolderId(0)
    }

    pub fn folder(&self, id: FolderId) -> &FolderNode {
        &self.folders[id.0]
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    pub fn folder_mut(&mut self, id: FolderId) -> &mut FolderNode {
        &mut self.folders[id.0]
    }

    pub fn file_mut(&mut self, id: FileId) -> &mut FileNode {
        &mut self.files[id.0]
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn join_path(parent_path: &str, name: &str) -> String {
        if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_path, name)
        }
    }

    fn find_child(&self, parent: FolderId, name: &str) -> Option<FolderId> {
        self.folders[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.folders[c.0].name == name)
    }

    fn find_file_in(&self, parent: FolderId, name: &str) -> Option<FileId> {
        self.folders[parent.0]
            .files
            .iter()
            .copied()
            .find(|&f| self.files[f.0].name == name)
    }

    /// Add a child folder under `parent`, or return the existing one
    pub fn add_folder(&mut self, parent: FolderId, name: &str) -> FolderId {
        if let Some(existing) = self.find_child(parent, name) {
            return existing;
        }

        let path = Self::join_path(&self.folders[parent.0].path, name);
        let id = FolderId(self.folders.len());
        self.folders.push(FolderNode {
            name: name.to_string(),
            path,
            parent: Some(parent),
            children: Vec::new(),
            files: Vec::new(),
            metadata: Vec::new(),
        });
        self.folders[parent.0].children.push(id);
        id
    }

    /// Create every missing folder along `path` and return the terminal one
    ///
    /// Idempotent: an existing path returns the existing folder. Empty
    /// segments are skipped, so `"a//b"` and `"a/b"` name the same folder.
    pub fn ensure_folder(&mut self, path: &str) -> FolderId {
        let mut current = self.root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.add_folder(current, segment);
        }
        current
    }

    /// Look up a folder by virtual path without creating anything
    pub fn find_folder(&self, path: &str) -> Option<FolderId> {
        let mut current = self.root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    /// Look up a file by virtual path
    pub fn find_file(&self, path: &str) -> Option<FileId> {
        match path.rsplit_once('/') {
            Some((folder_path, name)) => {
                let folder = self.find_folder(folder_path)?;
                self.find_file_in(folder, name)
            }
            None => self.find_file_in(self.root(), path),
        }
    }

    /// Navigation lookup that surfaces a miss as [`CresError::NotFound`]
    pub fn folder_at(&self, path: &str) -> Result<&FolderNode> {
        self.find_folder(path)
            .map(|id| self.folder(id))
            .ok_or_else(|| CresError::NotFound(format!("folder '{}'", path)))
    }

    /// Navigation lookup that surfaces a miss as [`CresError::NotFound`]
    pub fn file_at(&self, path: &str) -> Result<&FileNode> {
        self.find_file(path)
            .map(|id| self.file(id))
            .ok_or_else(|| CresError::NotFound(format!("file '{}'", path)))
    }

    /// Add a file under `parent`
    ///
    /// Fails with [`CresError::DuplicateEntry`] if `name` already exists
    /// among the folder's files. The media type is derived from the file
    /// extension and can be overridden afterwards.
    pub fn add_file(
        &mut self,
        parent: FolderId,
        name: &str,
        source_path: Option<&str>,
    ) -> Result<FileId> {
        if name.is_empty() || name.contains('/') {
            return Err(CresError::InvalidArgument(format!(
                "invalid file name '{}'",
                name
            )));
        }
        if self.find_file_in(parent, name).is_some() {
            let path = Self::join_path(&self.folders[parent.0].path, name);
            return Err(CresError::DuplicateEntry(path));
        }

        let path = Self::join_path(&self.folders[parent.0].path, name);
        let id = FileId(self.files.len());
        self.files.push(FileNode {
            name: name.to_string(),
            path,
            source_path: source_path.map(str::to_string),
            mime: crate::mime::from_path(name).to_string(),
            data: None,
            metadata: Vec::new(),
            parent,
        });
        self.folders[parent.0].files.push(id);
        Ok(id)
    }

    /// Append a metadata pair to a folder (no key deduplication)
    pub fn add_folder_metadata(&mut self, id: FolderId, key: &str, value: &str) {
        self.folders[id.0].metadata.push(MetadataEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Append a metadata pair to a file (no key deduplication)
    pub fn add_file_metadata(&mut self, id: FileId, key: &str, value: &str) {
        self.files[id.0].metadata.push(MetadataEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Read a file's bytes from its source path
    ///
    /// A no-op if the content is already present. Loading is all-or-nothing:
    /// on failure the node keeps no partial buffer.
    pub fn load_file_data(&mut self, id: FileId) -> Result<()> {
        if self.files[id.0].data.is_some() {
            return Ok(());
        }
        let source = self.files[id.0].source_path.clone().ok_or_else(|| {
            CresError::InvalidArgument(format!(
                "file '{}' has no source path",
                self.files[id.0].path
            ))
        })?;

        let data = fs::read(&source)?;
        debug!(path = %self.files[id.0].path, bytes = data.len(), "loaded file data");
        self.files[id.0].data = Some(data);
        Ok(())
    }

    /// Load every file's bytes, depth-first, files before child folders
    ///
    /// Stops at the first failure.
    pub fn load_all_data(&mut self) -> Result<()> {
        let order = self.files_preorder(self.root());
        for id in order {
            self.load_file_data(id)?;
        }
        Ok(())
    }

    /// File ids in pre-order: a folder's files, then its children recursively
    pub fn files_preorder(&self, from: FolderId) -> Vec<FileId> {
        let mut out = Vec::new();
        self.collect_files(from, &mut out);
        out
    }

    fn collect_files(&self, folder: FolderId, out: &mut Vec<FileId>) {
        out.extend(self.folders[folder.0].files.iter().copied());
        for &child in &self.folders[folder.0].children {
            self.collect_files(child, out);
        }
    }

    /// Every source path in pre-order, for dependency tracking
    pub fn source_paths(&self) -> Vec<&str> {
        self.files_preorder(self.root())
            .into_iter()
            .filter_map(|id| self.files[id.0].source_path.as_deref())
            .collect()
    }
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}
