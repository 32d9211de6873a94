//! Shared record shapes for generated output
//!
//! Every generated source file builds values of the same three C structs,
//! declared once in `cres/types.h`. The header is carried here verbatim so
//! independently compiled trees agree on layout and can be linked into one
//! program.

use crate::error::Result;
use std::io::Write;

/// Canonical text of `cres/types.h`
pub const TYPES_HEADER: &str = r#"/*
 * cres/types.h - Common type definitions for cres generated resources
 *
 * This header defines the standard structures used by all generated
 * resource files. Include it to work with embedded resources from
 * multiple source files.
 */

#ifndef CRES_TYPES_H
#define CRES_TYPES_H

#include <stddef.h>

#ifdef __cplusplus
extern "C" {
#endif

/*
 * Metadata key-value pair.
 */
typedef struct cres_metadata {
    const char *key;
    const char *value;
} cres_metadata_t;

/*
 * Forward declaration for folder type.
 */
typedef struct cres_folder cres_folder_t;

/*
 * Embedded file entry.
 */
typedef struct cres_file {
    const char *name;              /* Filename only (e.g., "icon.png") */
    const char *path;              /* Full virtual path (e.g., "images/icon.png") */
    const char *mime;              /* MIME type (e.g., "image/png") */
    const unsigned char *data;     /* Raw file data */
    size_t size;                   /* File size in bytes */
    const cres_folder_t *parent;   /* Parent folder */
    const cres_metadata_t *metadata;
    size_t metadata_count;
} cres_file_t;

/*
 * Virtual folder/directory.
 */
struct cres_folder {
    const char *name;              /* Folder name only (e.g., "images") */
    const char *path;              /* Full virtual path (e.g., "assets/images") */
    const cres_folder_t *parent;   /* Parent folder (NULL for root) */
    const cres_folder_t *children; /* First child folder */
    size_t child_count;            /* Number of child folders */
    const cres_file_t *files;      /* Files in this folder (array) */
    size_t file_count;             /* Number of files */
    const cres_metadata_t *metadata;
    size_t metadata_count;
};

#ifdef __cplusplus
}
#endif

#endif /* CRES_TYPES_H */
"#;

/// Write the shared types header to a sink
pub fn write_types_header<W: Write>(mut w: W) -> Result<()> {
    w.write_all(TYPES_HEADER.as_bytes())?;
    Ok(())
}
