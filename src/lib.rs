//! Cres-rs: static resource compiler
//!
//! Compiles a declarative resource manifest (a tree of files and folders,
//! each optionally carrying key/value metadata) into C source that embeds
//! the tree as statically-initialized, linkable data. No runtime loading:
//! the generated records live in the program binary and are navigable in
//! both directions (parent and children) through plain pointers.
//!
//! # Example
//!
//! ```no_run
//! use cres_rs::{codegen, Manifest};
//!
//! let manifest = Manifest::load("resources.json", "my_resources")?;
//! let options = codegen::CodegenOptions::new("my_resources.c", "my_resources.h");
//! codegen::generate(&manifest, &options)?;
//! # Ok::<(), cres_rs::error::CresError>(())
//! ```

// Core modules
pub mod codegen;
pub mod error;
pub mod glob;
pub mod manifest;
pub mod mime;
pub mod tree;

// Re-export commonly used types
pub use codegen::{generate, CodegenOptions, Emitter};
pub use error::{CresError, Result};
pub use manifest::Manifest;
pub use tree::{FileId, FileNode, FolderId, FolderNode, MetadataEntry, ResourceTree};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Ensure core types are accessible
        let tree = ResourceTree::new();
        assert_eq!(tree.folder(tree.root()).path, "");
    }
}
