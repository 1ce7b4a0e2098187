//! Resource location strings.
//!
//! Documents and images are addressed by relative or absolute location
//! strings, optionally carrying a `#fragment` that names an anchor inside
//! the target document.

/// A location split into its resource part and optional `#fragment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The resource path (may be empty for a bare `#fragment`).
    pub path: String,
    /// The anchor name after `#`, if any.
    pub fragment: Option<String>,
}

impl Location {
    /// Split `raw` at the first `#`.
    ///
    /// `data:` locations are never split, since their payload may contain `#`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("data:") {
            return Self {
                path: raw.to_string(),
                fragment: None,
            };
        }
        match raw.split_once('#') {
            Some((path, fragment)) => Self {
                path: path.to_string(),
                fragment: (!fragment.is_empty()).then(|| fragment.to_string()),
            },
            None => Self {
                path: raw.to_string(),
                fragment: None,
            },
        }
    }

    /// Returns `true` if this location only names an anchor in the current
    /// document.
    #[must_use]
    pub fn is_same_document(&self) -> bool {
        self.path.is_empty()
    }
}

/// Returns `true` if `href` is already absolute (a scheme or a rooted path).
#[must_use]
pub fn is_absolute(href: &str) -> bool {
    href.starts_with('/')
        || href
            .split_once(':')
            .is_some_and(|(scheme, _)| scheme.len() > 1 && scheme.chars().all(char::is_alphanumeric))
}

/// Resolve a potentially relative location against the location of the
/// document that references it.
///
/// Absolute locations are returned unchanged. Relative locations are joined
/// with the directory part of `base`, and `.`/`..` segments are folded.
#[must_use]
pub fn resolve_location(href: &str, base: Option<&str>) -> String {
    if is_absolute(href) || href.starts_with('#') {
        return href.to_string();
    }
    let Some(base) = base else {
        return normalize_segments(href);
    };
    let base = Location::parse(base).path;
    match base.rsplit_once('/') {
        Some((dir, _)) => normalize_segments(&format!("{dir}/{href}")),
        None => normalize_segments(href),
    }
}

/// Fold `.` and `..` path segments.
fn normalize_segments(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    let _ = segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if rooted { format!("/{joined}") } else { joined }
}
