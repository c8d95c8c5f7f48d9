use std::path::{Component, Path, PathBuf};

/// Lexically resolves `path` against `base`, dropping `.` and folding `..` without touching
/// the filesystem, so a target that doesn't exist yet can still be normalized.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);

    let mut new_path = PathBuf::new();

    for component in joined.components() {
        match component {
            // Skip the current-dir marker "."
            Component::CurDir => {}

            // For "..", pop the last component if possible
            Component::ParentDir => {
                new_path.pop();
            }

            // Roots, prefixes and normal components are pushed as is
            other => new_path.push(other.as_os_str()),
        }
    }

    new_path
}

/// Returns `true` when `path` is non-empty and made only of normal components,
/// i.e. joining it onto a root can never land outside that root.
pub fn is_contained(path: &Path) -> bool {
    let mut components = path.components().peekable();

    if components.peek().is_none() {
        return false;
    }

    components.all(|component| matches!(component, Component::Normal(_)))
}

/// Checks `name` against the npm package naming rules (lowercase, url-safe, optional scope).
pub fn is_valid_package_name(name: &str) -> bool {
    lazy_static::lazy_static! {
        static ref PACKAGE_NAME_REGEX: regex::Regex = regex::Regex::new(
            r"(?x)        # Enable extended mode
            ^(?:
                # optional scope: @scope/
                @[a-z0-9~\-][a-z0-9._~\-]*/
            )?
            # name: no leading dot or underscore
            [a-z0-9~\-][a-z0-9._~\-]*$"
        ).expect("a valid regex pattern");
    }

    name.len() <= 214 && PACKAGE_NAME_REGEX.is_match(name)
}
