//! Extension-based binary detection
//!
//! A heuristic only: content is never inspected, so a text file with a binary
//! extension is skipped and an extensionless binary is treated as text.

use std::path::Path;

/// Extensions whose content is never rewritten (images, archives, executables, fonts, media)
const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "webp", "tif", "tiff", "psd", "avif",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst", "jar",
    // executables and libraries
    "exe", "dll", "so", "dylib", "a", "lib", "o", "obj", "bin", "wasm", "node", "class", "pyc",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // documents and media
    "pdf", "mp3", "mp4", "wav", "ogg", "webm", "mov", "avi",
    // databases
    "sqlite", "db",
];

/// Whether a file should be copied as opaque bytes, judged by extension (case-insensitive)
pub fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
