//! Extension to media-type lookup
//!
//! A fixed table keyed on the file extension, with
//! `application/octet-stream` as the fallback. Matching is ASCII
//! case-insensitive and tolerates a leading dot.

/// Fallback for unknown extensions
pub const DEFAULT_MIME: &str = "application/octet-stream";

static MIME_TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("xhtml", "application/xhtml+xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("rar", "application/vnd.rar"),
    ("7z", "application/x-7z-compressed"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    ("wav", "audio/wav"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("flac", "audio/flac"),
    ("aac", "audio/aac"),
    ("m4a", "audio/mp4"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("mov", "video/quicktime"),
    ("ogv", "video/ogg"),
    ("glsl", "text/plain"),
    ("vert", "text/plain"),
    ("frag", "text/plain"),
    ("hlsl", "text/plain"),
    ("c", "text/x-c"),
    ("h", "text/x-c"),
    ("cpp", "text/x-c++"),
    ("hpp", "text/x-c++"),
    ("cc", "text/x-c++"),
    ("hh", "text/x-c++"),
    ("py", "text/x-python"),
    ("rb", "text/x-ruby"),
    ("rs", "text/x-rust"),
    ("go", "text/x-go"),
    ("java", "text/x-java"),
    ("sh", "application/x-sh"),
    ("bash", "application/x-sh"),
    ("zsh", "application/x-sh"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("yaml", "text/yaml"),
    ("yml", "text/yaml"),
    ("toml", "application/toml"),
    ("ini", "text/plain"),
    ("cfg", "text/plain"),
    ("conf", "text/plain"),
    ("sql", "application/sql"),
    ("wasm", "application/wasm"),
];

/// Best-guess media type for a file extension
pub fn from_extension(extension: &str) -> &'static str {
    let extension = extension.strip_prefix('.').unwrap_or(extension);

    MIME_TABLE
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|&(_, mime)| mime)
        .unwrap_or(DEFAULT_MIME)
}

/// Best-guess media type for a file name or path
///
/// A name without an extension, or one starting with a dot and containing
/// no other dot (e.g. ".gitignore"), falls back to the generic type.
pub fn from_path(path: &str) -> &'static str {
    match path.rfind('.') {
        Some(0) | None => DEFAULT_MIME,
        Some(pos) => from_extension(&path[pos + 1..]),
    }
}
