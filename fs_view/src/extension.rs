//! File extension classification

/// Second-to-last name segments that form one extension with the last segment
///
/// Kept as a fixed list: whether `a.b.c` means extension `c` or `b.c` cannot
/// be inferred from the name alone.
pub const COMPOUND_EXTENSION_HEADS: &[&str] = &["tar"];

/// Derives the extension of an object name
///
/// Directories never have an extension. For files the base name is split on
/// `.`:
/// - zero or one segment: no extension
/// - two segments: the last one
/// - three or more: the last two joined by `.` when the second-to-last is a
///   [`COMPOUND_EXTENSION_HEADS`] entry, otherwise just the last one
///
/// ```
/// use fs_view::extension_of;
///
/// assert_eq!(extension_of("a.txt", false), "txt");
/// assert_eq!(extension_of("archive.tar.gz", false), "tar.gz");
/// assert_eq!(extension_of("noext", false), "");
/// assert_eq!(extension_of("dirname.d", true), "");
/// ```
pub fn extension_of(name: &str, is_dir: bool) -> String {
    if is_dir {
        return String::new();
    }

    let base = name.rsplit('/').next().unwrap_or(name);
    let parts: Vec<&str> = base.split('.').collect();

    match parts.as_slice() {
        [] | [_] => String::new(),
        [.., head, last] if parts.len() > 2 && COMPOUND_EXTENSION_HEADS.contains(head) => {
            format!("{}.{}", head, last)
        }
        [.., last] => (*last).to_string(),
    }
}
