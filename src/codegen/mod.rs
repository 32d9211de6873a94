//! C source generation
//!
//! Turns a populated [`crate::tree::ResourceTree`] into two artifacts: a
//! header of `extern` declarations and a source file of statically
//! allocated record definitions, ready to compile and link into the host
//! program.

mod emit;
mod plan;
mod symbols;
mod types;
mod writer;

pub use emit::Emitter;
pub use plan::{EmissionPlan, FolderStats, MetaOwner};
pub use symbols::{sanitize, SymbolRegistry};
pub use types::{write_types_header, TYPES_HEADER};
pub use writer::SourceWriter;

use crate::error::Result;
use crate::manifest::Manifest;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output locations for one generation run
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Output C source file
    pub source_path: PathBuf,
    /// Output C header file
    pub header_path: PathBuf,
}

impl CodegenOptions {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(source_path: P, header_path: Q) -> Self {
        Self {
            source_path: source_path.into(),
            header_path: header_path.into(),
        }
    }
}

/// Basename used in the generated `#include` directive
fn header_include_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Generate both artifacts for a loaded manifest
///
/// Failing to open either output is fatal; nothing guarantees a partially
/// written artifact is cleaned up, a failed build is expected to be re-run.
pub fn generate(manifest: &Manifest, options: &CodegenOptions) -> Result<()> {
    let mut emitter = Emitter::new(&manifest.tree, &manifest.name);

    let header = File::create(&options.header_path)?;
    emitter.write_header(BufWriter::new(header))?;

    let source = File::create(&options.source_path)?;
    emitter.write_source(
        BufWriter::new(source),
        &header_include_name(&options.header_path),
    )?;

    info!(
        name = %manifest.name,
        source = %options.source_path.display(),
        header = %options.header_path.display(),
        "generated resource artifacts"
    );
    Ok(())
}
