//! @ai:module:intent Relative path computation for resolved file lists
//! @ai:module:layer infrastructure
//! @ai:module:public_api relativize, normalize, to_posix
//! @ai:module:stateless true

use std::path::{Component, Path, PathBuf};

/// @ai:intent Lexically normalize a path by dropping `.` and folding `..`
/// @ai:effects pure
/// @ai:example ("./lib/../src/a.js") -> "src/a.js"
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// @ai:intent Render a path with `/` separators regardless of platform
/// @ai:effects pure
pub fn to_posix(path: &Path) -> String {
    let mut out = String::new();

    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }

    out
}

/// @ai:intent Express target relative to base
/// @ai:pre base exists (checked by the caller)
/// @ai:post posix output uses `/`, otherwise the platform separator
/// @ai:effects pure
pub fn relativize(base: &Path, target: &Path, posix: bool) -> String {
    let base = normalize(base);
    let target = normalize(target);
    let relative = pathdiff::diff_paths(&target, &base).unwrap_or(target);

    if posix {
        to_posix(&relative)
    } else {
        relative.display().to_string()
    }
}
