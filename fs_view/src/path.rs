//! Path normalization
//!
//! Paths handed to the view are plain `/`-separated strings. They may arrive
//! with or without leading/trailing separators and with `.`/`..` segments;
//! everything is cleaned lexically here, without ever touching the device.

/// The only separator understood by the view
pub const PATH_SEP: char = '/';

/// Canonical form of the container root
pub const ROOT_PATH: &str = "/";

/// Canonicalizes a path
///
/// The result always has exactly one leading separator, no empty, `.` or `..`
/// segments, and no trailing separator unless it is the root itself.
/// `..` above the root stays at the root. Total over all inputs; the empty
/// string normalizes to `/`.
///
/// # Examples
///
/// ```
/// use fs_view::path::normalize;
///
/// assert_eq!(normalize("DCIM/Camera/"), "/DCIM/Camera");
/// assert_eq!(normalize("//DCIM/./../Music"), "/Music");
/// assert_eq!(normalize(""), "/");
/// ```
pub fn normalize(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();

    for segment in path.split(PATH_SEP) {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }

    if stack.is_empty() {
        return ROOT_PATH.to_string();
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in stack {
        normalized.push(PATH_SEP);
        normalized.push_str(segment);
    }
    normalized
}

/// Joins a parent path and a child name, then normalizes the result
///
/// ```
/// use fs_view::path::join;
///
/// assert_eq!(join("/DCIM/", "a.jpg"), "/DCIM/a.jpg");
/// assert_eq!(join("", "Music"), "/Music");
/// ```
pub fn join(parent: &str, name: &str) -> String {
    normalize(&format!("{}{}{}", parent, PATH_SEP, name))
}

/// Normalized parent of a path (the root is its own parent)
///
/// ```
/// use fs_view::path::parent_of;
///
/// assert_eq!(parent_of("/DCIM/Camera/a.jpg"), "/DCIM/Camera");
/// assert_eq!(parent_of("/DCIM"), "/");
/// ```
pub fn parent_of(path: &str) -> String {
    normalize(&format!("{}{}..", normalize(path), PATH_SEP))
}

/// Returns true when `path` normalizes to the root
pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT_PATH
}

/// Splits a path into its non-empty segments after normalization
///
/// The root yields no segments.
pub fn segments(path: &str) -> Vec<String> {
    normalize(path)
        .split(PATH_SEP)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates a single object name
///
/// Returns true if the name can be handed to the device as a base name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(PATH_SEP)
        && !name.contains('\0')
}

/// Returns true for dot-files
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Longest common directory shared by all given paths
///
/// Every path is normalized first. Comparison is byte-wise and the result is
/// cut back to the last separator, so `/a/bc` and `/a/bd` share `/a`, not
/// `/a/b`. No paths yield an empty string; a single path yields itself.
///
/// ```
/// use fs_view::path::common_parent_path;
///
/// assert_eq!(common_parent_path(&["/a/b/c", "/a/b/d/e"]), "/a/b");
/// assert_eq!(common_parent_path(&["/a", "/b"]), "");
/// ```
pub fn common_parent_path<S: AsRef<str>>(paths: &[S]) -> String {
    match paths {
        [] => return String::new(),
        [only] => return normalize(only.as_ref()),
        _ => {}
    }

    // Trailing separator so a path that is itself the common directory
    // (e.g. "/a" among "/a/x") survives the final cut. Root becomes "//"
    // here and is cut back to "" below.
    let with_sep = |path: &str| {
        let mut cleaned = normalize(path);
        cleaned.push(PATH_SEP);
        cleaned
    };

    let mut common = with_sep(paths[0].as_ref()).into_bytes();
    for path in &paths[1..] {
        let candidate = with_sep(path.as_ref());
        let candidate = candidate.as_bytes();

        let shared = common
            .iter()
            .zip(candidate.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }

    match common.iter().rposition(|&b| b == PATH_SEP as u8) {
        Some(idx) => common.truncate(idx),
        None => common.clear(),
    }

    String::from_utf8_lossy(&common).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_leading_separator() {
        assert_eq!(normalize("docs"), "/docs");
        assert_eq!(normalize("docs/notes"), "/docs/notes");
    }

    #[test]
    fn test_normalize_strips_trailing_separator() {
        assert_eq!(normalize("/docs/"), "/docs");
        assert_eq!(normalize("docs///"), "/docs");
    }

    #[test]
    fn test_normalize_root_forms() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("///"), "/");
        assert_eq!(normalize("."), "/");
        assert_eq!(normalize("/.."), "/");
    }

    #[test]
    fn test_normalize_collapses_redundant_separators() {
        assert_eq!(normalize("//docs//notes.txt"), "/docs/notes.txt");
    }

    #[test]
    fn test_normalize_relative_segments() {
        assert_eq!(normalize("/docs/./notes.txt"), "/docs/notes.txt");
        assert_eq!(normalize("/docs/../notes.txt"), "/notes.txt");
        assert_eq!(normalize("/a/b/../../../c"), "/c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["", "/", "a//b/", "/x/./y/../z", "..", "mtp-test-files/"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/docs", "notes.txt"), "/docs/notes.txt");
        assert_eq!(join("/docs/", "notes.txt"), "/docs/notes.txt");
        assert_eq!(join("/", "notes.txt"), "/notes.txt");
        assert_eq!(join("", ""), "/");
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/a/b/c"), "/a/b");
        assert_eq!(parent_of("a/b/"), "/a");
        assert_eq!(parent_of("/a"), "/");
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of(""), "/");
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(segments("a//b/"), vec!["a", "b"]);
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_is_root() {
        assert!(is_root(""));
        assert!(is_root("//"));
        assert!(!is_root("/a"));
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("todo.txt"));
        assert!(is_valid_name("my folder"));
        assert!(is_valid_name(".hidden"));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("has/slash"));
        assert!(!is_valid_name("has\0null"));
    }

    #[test]
    fn test_is_hidden_name() {
        assert!(is_hidden_name(".thumbnails"));
        assert!(!is_hidden_name("DCIM"));
        assert!(!is_hidden_name(""));
    }

    #[test]
    fn test_common_parent_path() {
        let empty: [&str; 0] = [];
        assert_eq!(common_parent_path(&empty), "");
        assert_eq!(common_parent_path(&["/a/b/"]), "/a/b");
        assert_eq!(common_parent_path(&["/a/b/c", "/a/b/d"]), "/a/b");
        assert_eq!(common_parent_path(&["/a/bc", "/a/bd"]), "/a");
        assert_eq!(common_parent_path(&["/a", "/a/x", "/a/y/z"]), "/a");
        assert_eq!(common_parent_path(&["/a/x", "/b/y"]), "");
    }
}
