//! Manifest ingestion
//!
//! A manifest declares the resource tree to embed: optional root metadata
//! and a list of entries, each one of three kinds:
//!
//! ```json
//! {
//!   "metadata": { "version": "1.0" },
//!   "entries": [
//!     { "type": "file",   "path": "readme.txt", "source": "docs/readme.txt" },
//!     { "type": "folder", "path": "assets", "entries": [ ... ] },
//!     { "type": "glob",   "pattern": "images/*.png", "target": "images" }
//!   ]
//! }
//! ```
//!
//! Manifests may be JSON or TOML (same schema); both are parsed into one
//! structured-value form before ingestion. Source paths are resolved
//! relative to the manifest's directory.
//!
//! Loading comes in two modes: [`Manifest::load`] reads every source
//! file's bytes up front, while [`Manifest::load_unloaded`] only builds
//! the tree, which is all dependency listing needs.

use crate::error::{CresError, Result};
use crate::tree::{FolderId, ResourceTree};
use serde_json::Value;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, info};

/// A compiled manifest: the base name for generated symbols, the directory
/// source paths resolve against, and the populated resource tree
#[derive(Debug)]
pub struct Manifest {
    pub name: String,
    pub base_dir: String,
    pub tree: ResourceTree,
}

/// One manifest entry, decoded from its structured-value form
///
/// The kind set is closed; ingestion matches on it exhaustively.
enum ManifestEntry<'a> {
    File {
        path: &'a str,
        source: &'a str,
        mime: Option<&'a str>,
        metadata: Option<&'a Value>,
    },
    Folder {
        path: &'a str,
        entries: Option<&'a Vec<Value>>,
        metadata: Option<&'a Value>,
    },
    Glob {
        pattern: &'a str,
        target: &'a str,
        metadata: Option<&'a Value>,
    },
}

fn get_str<'v>(obj: &'v Value, key: &str) -> Option<&'v str> {
    obj.get(key).and_then(Value::as_str)
}

fn require_str<'v>(obj: &'v Value, key: &str, kind: &str) -> Result<&'v str> {
    get_str(obj, key).ok_or_else(|| {
        CresError::InvalidArgument(format!("{} entry missing string field '{}'", kind, key))
    })
}

impl<'a> ManifestEntry<'a> {
    fn from_value(entry: &'a Value) -> Result<Self> {
        if !entry.is_object() {
            return Err(CresError::InvalidArgument(
                "manifest entry must be an object".to_string(),
            ));
        }

        let kind = require_str(entry, "type", "manifest")?;
        let metadata = entry.get("metadata");

        match kind {
            "file" => Ok(ManifestEntry::File {
                path: require_str(entry, "path", "file")?,
                source: require_str(entry, "source", "file")?,
                mime: get_str(entry, "mime"),
                metadata,
            }),
            "folder" => {
                let entries = match entry.get("entries") {
                    None => None,
                    Some(Value::Array(items)) => Some(items),
                    Some(_) => {
                        return Err(CresError::InvalidArgument(
                            "folder 'entries' must be an array".to_string(),
                        ))
                    }
                };
                Ok(ManifestEntry::Folder {
                    path: require_str(entry, "path", "folder")?,
                    entries,
                    metadata,
                })
            }
            "glob" => Ok(ManifestEntry::Glob {
                pattern: require_str(entry, "pattern", "glob")?,
                target: require_str(entry, "target", "glob")?,
                metadata,
            }),
            other => Err(CresError::InvalidArgument(format!(
                "unknown manifest entry type '{}'",
                other
            ))),
        }
    }
}

/// Last path component ("a/b/c.txt" -> "c.txt")
fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Everything before the last component ("a/b/c.txt" -> "a/b", "c.txt" -> "")
fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Join two `/`-separated paths, dropping a leading `./` from the second
fn join_paths(a: &str, b: &str) -> String {
    let mut b = b;
    while let Some(rest) = b.strip_prefix("./") {
        b = rest;
    }
    if a.is_empty() {
        b.to_string()
    } else if b.is_empty() {
        a.to_string()
    } else if a.ends_with('/') {
        format!("{}{}", a, b)
    } else {
        format!("{}/{}", a, b)
    }
}

/// String-valued pairs of an entry's `metadata` object, in manifest order
///
/// Non-string values are ignored, matching the fixed string/string shape of
/// emitted metadata records.
fn metadata_pairs(obj: Option<&Value>) -> Vec<(&str, &str)> {
    let Some(Value::Object(map)) = obj else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
        .collect()
}

impl Manifest {
    /// Load a manifest and every source file's bytes
    ///
    /// The format is chosen by extension: `.toml` parses as TOML, anything
    /// else as JSON.
    pub fn load<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        let mut manifest = Self::load_unloaded(path, name)?;
        manifest.load_data()?;
        Ok(manifest)
    }

    /// Load a manifest without reading any source bytes
    ///
    /// Used for dependency listing, where the tree's source references are
    /// wanted even when the sources do not exist yet.
    pub fn load_unloaded<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml(&text, name, &base_dir)
        } else {
            Self::from_json(&text, name, &base_dir)
        }
    }

    /// Build a manifest from JSON text (no source bytes are read)
    pub fn from_json(text: &str, name: &str, base_dir: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value, name, base_dir)
    }

    /// Build a manifest from TOML text (no source bytes are read)
    pub fn from_toml(text: &str, name: &str, base_dir: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(text)?;
        // Funnel through the common structured-value form
        let value = serde_json::to_value(value)?;
        Self::from_value(&value, name, base_dir)
    }

    fn from_value(value: &Value, name: &str, base_dir: &str) -> Result<Self> {
        if !value.is_object() {
            return Err(CresError::InvalidArgument(
                "manifest root must be an object".to_string(),
            ));
        }

        let mut tree = ResourceTree::new();

        let root = tree.root();
        for (key, val) in metadata_pairs(value.get("metadata")) {
            tree.add_folder_metadata(root, key, val);
        }

        if let Some(entries) = value.get("entries") {
            let items = entries.as_array().ok_or_else(|| {
                CresError::InvalidArgument("manifest 'entries' must be an array".to_string())
            })?;
            for entry in items {
                process_entry(&mut tree, base_dir, entry, root)?;
            }
        }

        info!(
            name,
            folders = tree.folder_count(),
            files = tree.file_count(),
            "manifest ingested"
        );

        Ok(Self {
            name: name.to_string(),
            base_dir: base_dir.to_string(),
            tree,
        })
    }

    /// Read every file's bytes from its source path, first failure aborts
    pub fn load_data(&mut self) -> Result<()> {
        self.tree.load_all_data()
    }

    /// Every source file reference, one per line, no trailing newline
    pub fn dependency_list(&self) -> String {
        self.tree.source_paths().join("\n")
    }

    /// Makefile-format dependency rule: `targets...: dep dep ...`
    pub fn depfile(&self, targets: &[&str]) -> String {
        let mut rule = String::new();
        rule.push_str(&targets.join(" "));
        rule.push(':');
        for dep in self.tree.source_paths() {
            rule.push(' ');
            rule.push_str(dep);
        }
        rule.push('\n');
        rule
    }
}

fn process_entry(
    tree: &mut ResourceTree,
    base_dir: &str,
    entry: &Value,
    parent: FolderId,
) -> Result<()> {
    match ManifestEntry::from_value(entry)? {
        ManifestEntry::File {
            path,
            source,
            mime,
            metadata,
        } => {
            let full_source = join_paths(base_dir, source);

            // The entry's path may carry folders of its own; they nest
            // under the enclosing folder entry.
            let parent_path = &tree.folder(parent).path;
            let folder_path = match (parent_path.is_empty(), dirname(path)) {
                (_, "") => parent_path.clone(),
                (true, dir) => dir.to_string(),
                (false, dir) => join_paths(parent_path, dir),
            };

            let folder = tree.ensure_folder(&folder_path);
            let file = tree.add_file(folder, basename(path), Some(&full_source))?;

            if let Some(mime) = mime {
                tree.file_mut(file).mime = mime.to_string();
            }
            for (key, val) in metadata_pairs(metadata) {
                tree.add_file_metadata(file, key, val);
            }
            debug!(path = %tree.file(file).path, source = %full_source, "added file");
            Ok(())
        }

        ManifestEntry::Folder {
            path,
            entries,
            metadata,
        } => {
            let full_path = join_paths(&tree.folder(parent).path, path);
            let folder = tree.ensure_folder(&full_path);

            for (key, val) in metadata_pairs(metadata) {
                tree.add_folder_metadata(folder, key, val);
            }

            if let Some(items) = entries {
                for nested in items {
                    process_entry(tree, base_dir, nested, folder)?;
                }
            }
            Ok(())
        }

        ManifestEntry::Glob {
            pattern,
            target,
            metadata,
        } => {
            let full_target = join_paths(&tree.folder(parent).path, target);
            let meta = metadata_pairs(metadata);

            crate::glob::for_each_match(pattern, base_dir, |source| {
                let folder = tree.ensure_folder(&full_target);
                let name = basename(source).to_string();

                match tree.add_file(folder, &name, Some(source)) {
                    Ok(file) => {
                        for &(key, val) in &meta {
                            tree.add_file_metadata(file, key, val);
                        }
                    }
                    // Two matches with the same basename: first wins
                    Err(CresError::DuplicateEntry(_)) => {}
                    Err(err) => return Err(err),
                }
                Ok(ControlFlow::Continue(()))
            })
        }
    }
}
