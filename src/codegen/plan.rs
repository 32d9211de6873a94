//! Emission planning
//!
//! Two traversals of the finished tree fix every index the emitter needs:
//!
//! 1. A pre-order sweep (a folder's files, then its children, depth-first)
//!    assigns each file its byte-data index, numbers metadata owners in the
//!    same sweep order, and records per-folder counts.
//! 2. A post-order sweep fixes the folder definition order (children
//!    strictly before parents, root last).
//!
//! Byte-data emission and file-record emission both consume the pre-order
//! sequence, so a record's data reference and the array it names are
//! assigned in lock-step. That lock-step is the plan's contract; the
//! emitter cross-checks it and treats disagreement as an internal error.

use crate::tree::{FileId, FolderId, ResourceTree};
use std::collections::HashMap;

/// A node owning at least one metadata entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaOwner {
    Folder(FolderId),
    File(FileId),
}

/// Per-folder counts fixed at planning time
#[derive(Debug, Clone, Copy)]
pub struct FolderStats {
    /// Data index of the folder's first file
    pub files_start: usize,
    pub file_count: usize,
    pub child_count: usize,
}

#[derive(Debug)]
pub struct EmissionPlan {
    /// Files in byte-data emission order
    pub data_order: Vec<FileId>,
    /// All folders, root first
    pub folders_preorder: Vec<FolderId>,
    /// All folders, children before parents, root last
    pub folders_postorder: Vec<FolderId>,
    /// Metadata owners in block emission order
    pub meta_order: Vec<MetaOwner>,
    data_index: HashMap<FileId, usize>,
    file_meta: HashMap<FileId, usize>,
    folder_meta: HashMap<FolderId, usize>,
    stats: HashMap<FolderId, FolderStats>,
}

impl EmissionPlan {
    pub fn build(tree: &ResourceTree) -> Self {
        let mut plan = Self {
            data_order: Vec::new(),
            folders_preorder: Vec::new(),
            folders_postorder: Vec::new(),
            meta_order: Vec::new(),
            data_index: HashMap::new(),
            file_meta: HashMap::new(),
            folder_meta: HashMap::new(),
            stats: HashMap::new(),
        };
        plan.index_preorder(tree, tree.root());
        plan.index_postorder(tree, tree.root());
        plan
    }

    fn index_preorder(&mut self, tree: &ResourceTree, folder: FolderId) {
        self.folders_preorder.push(folder);

        let node = tree.folder(folder);
        if !node.metadata.is_empty() {
            self.folder_meta.insert(folder, self.meta_order.len());
            self.meta_order.push(MetaOwner::Folder(folder));
        }

        let files_start = self.data_order.len();
        for &file in &node.files {
            self.data_index.insert(file, self.data_order.len());
            self.data_order.push(file);
            if !tree.file(file).metadata.is_empty() {
                self.file_meta.insert(file, self.meta_order.len());
                self.meta_order.push(MetaOwner::File(file));
            }
        }

        self.stats.insert(
            folder,
            FolderStats {
                files_start,
                file_count: node.files.len(),
                child_count: node.children.len(),
            },
        );

        for &child in &node.children {
            self.index_preorder(tree, child);
        }
    }

    fn index_postorder(&mut self, tree: &ResourceTree, folder: FolderId) {
        for &child in &tree.folder(folder).children {
            self.index_postorder(tree, child);
        }
        self.folders_postorder.push(folder);
    }

    /// Byte-data index assigned to a file
    pub fn data_index(&self, file: FileId) -> Option<usize> {
        self.data_index.get(&file).copied()
    }

    /// Metadata block index of a file, if it owns metadata
    pub fn file_meta_index(&self, file: FileId) -> Option<usize> {
        self.file_meta.get(&file).copied()
    }

    /// Metadata block index of a folder, if it owns metadata
    pub fn folder_meta_index(&self, folder: FolderId) -> Option<usize> {
        self.folder_meta.get(&folder).copied()
    }

    pub fn folder_stats(&self, folder: FolderId) -> Option<FolderStats> {
        self.stats.get(&folder).copied()
    }
}
