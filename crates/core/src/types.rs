/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Hex-encoded content fingerprint of a source file.
///
/// The empty string is the sentinel produced when the file could not be
/// read; it never matches a stored fingerprint.
pub type FileHash = String;
