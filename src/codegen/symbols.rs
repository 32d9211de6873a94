//! Symbol naming
//!
//! Virtual paths become C identifiers by replacing every non-alphanumeric
//! byte with `_`, tagged by role: `<name>_root` for the root folder,
//! `<name>_dir_<path>` for other folders, `<name>_file_<path>` for files.
//!
//! Sanitization is lossy ("a-b" and "a_b" collide), so symbols are interned
//! in a registry that rejects two distinct paths claiming the same
//! identifier instead of silently aliasing them.

use crate::error::{CresError, Result};
use std::collections::HashMap;

/// Replace every non-alphanumeric character with `_`
///
/// The empty path maps to the distinguished identifier `root`.
pub fn sanitize(path: &str) -> String {
    if path.is_empty() {
        return "root".to_string();
    }
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Per-emission symbol table, threaded through planner and emitter
#[derive(Debug)]
pub struct SymbolRegistry {
    prefix: String,
    // symbol -> virtual path that first claimed it
    seen: HashMap<String, String>,
}

impl SymbolRegistry {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            seen: HashMap::new(),
        }
    }

    /// The root folder symbol, `<name>_root`
    pub fn root_symbol(&self) -> String {
        format!("{}_root", self.prefix)
    }

    /// Folder symbol for a virtual path (the root yields `<name>_root`)
    pub fn dir_symbol(&mut self, path: &str) -> Result<String> {
        let symbol = if path.is_empty() {
            self.root_symbol()
        } else {
            format!("{}_dir_{}", self.prefix, sanitize(path))
        };
        self.intern(symbol, path)
    }

    /// File symbol for a virtual path
    pub fn file_symbol(&mut self, path: &str) -> Result<String> {
        let symbol = format!("{}_file_{}", self.prefix, sanitize(path));
        self.intern(symbol, path)
    }

    fn intern(&mut self, symbol: String, path: &str) -> Result<String> {
        match self.seen.get(&symbol) {
            Some(first) if first != path => Err(CresError::SymbolCollision {
                symbol,
                first: first.clone(),
                second: path.to_string(),
            }),
            Some(_) => Ok(symbol),
            None => {
                self.seen.insert(symbol.clone(), path.to_string());
                Ok(symbol)
            }
        }
    }
}
