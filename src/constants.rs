//! Distinguished encoding-format values and cache subdirectory names.
//!
//! These are the only vocabulary values the builder dispatches on; the
//! full schema vocabulary lives with the (external) metadata parser.

/// Encoding format marking a repository-style remote whose transport
/// exposes a browsable file tree (no generic archive extraction).
pub const GIT_HTTPS_ENCODING_FORMAT: &str = "git+https";

/// Encoding formats whose bytes must be unpacked before members can be
/// listed or read.
pub const ZIP_ENCODING_FORMAT: &str = "application/zip";
pub const TAR_ENCODING_FORMAT: &str = "application/x-tar";

/// Subdirectory of the root folder holding raw downloaded bytes.
pub const DOWNLOAD_DIR: &str = "download";

/// Subdirectory of the root folder holding extracted archive contents.
pub const EXTRACT_DIR: &str = "extract";

/// Whether the given encoding format requires an extraction step.
pub fn should_extract(encoding_format: Option<&str>) -> bool {
    encoding_format
        .is_some_and(|f| f == ZIP_ENCODING_FORMAT || f == TAR_ENCODING_FORMAT)
}
