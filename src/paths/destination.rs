// src/paths/destination.rs

//! Destination decomposition.
//!
//! A raw destination like `public/css/app.css` is split on its last `/` and
//! the file part on its last `.`. Missing pieces are filled in from the
//! global destination root and the group's default base-name counter.

use crate::names::NameAllocator;

/// A naming namespace sharing one default base-name counter, plus the
/// extension given to generated file names in that namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub name: &'static str,
    pub extension: Option<&'static str>,
}

impl Group {
    pub const FILES: Group = Group::new("files", None);
    pub const CSS: Group = Group::new("css", Some("css"));
    pub const JS: Group = Group::new("js", Some("js"));

    pub const fn new(name: &'static str, extension: Option<&'static str>) -> Self {
        Self { name, extension }
    }
}

/// Resolved output location of one operation.
///
/// When `file` is non-empty, `base_name` plus `.extension` (if any) equals
/// `file`. Directory-only destinations leave `file` and `extension` empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DestinationSpec {
    pub directory: String,
    pub file: String,
    pub base_name: String,
    pub extension: String,
}

impl DestinationSpec {
    /// Path of the output file, or the directory for directory targets.
    pub fn output_path(&self) -> String {
        if self.file.is_empty() {
            self.directory.clone()
        } else {
            format!("{}/{}", self.directory, self.file)
        }
    }

    pub fn is_file_target(&self) -> bool {
        !self.file.is_empty()
    }
}

/// Split `raw` into (directory part, trailing segment) on the last `/`.
///
/// `styles/app.css` -> (`styles`, `app.css`), `app.css` -> (``, `app.css`),
/// `styles/` -> (`styles`, ``).
pub fn split_last_segment(raw: &str) -> (&str, &str) {
    raw.rsplit_once('/').unwrap_or(("", raw))
}

/// Split a file name into (base name, extension) on the last `.`.
///
/// An empty extension (`app.`) counts as no extension.
pub fn split_extension(file: &str) -> (&str, &str) {
    match file.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, ext),
        _ => (file, ""),
    }
}

pub(crate) fn resolve(
    raw: &str,
    is_file_target: bool,
    group: Group,
    dest_root: &str,
    names: &mut NameAllocator,
) -> DestinationSpec {
    if is_file_target {
        resolve_file(raw, group, dest_root, names)
    } else {
        resolve_directory(raw, group, dest_root, names)
    }
}

fn resolve_file(
    raw: &str,
    group: Group,
    dest_root: &str,
    names: &mut NameAllocator,
) -> DestinationSpec {
    let (dir, segment) = split_last_segment(raw);

    let file = if segment.is_empty() {
        let generated = names.allocate_group_default(group.name);
        match group.extension {
            Some(ext) => format!("{generated}.{ext}"),
            None => generated,
        }
    } else {
        segment.to_string()
    };

    let directory = if dir.is_empty() { dest_root } else { dir };
    let (base_name, extension) = split_extension(&file);

    DestinationSpec {
        directory: directory.to_string(),
        base_name: base_name.to_string(),
        extension: extension.to_string(),
        file,
    }
}

fn resolve_directory(
    raw: &str,
    group: Group,
    dest_root: &str,
    names: &mut NameAllocator,
) -> DestinationSpec {
    let (_, segment) = split_last_segment(raw);

    let base_name = if segment.is_empty() {
        names.allocate_group_default(group.name)
    } else {
        segment.to_string()
    };

    let trimmed = raw.strip_suffix('/').unwrap_or(raw);
    let directory = if trimmed.is_empty() { dest_root } else { trimmed };

    DestinationSpec {
        directory: directory.to_string(),
        file: String::new(),
        base_name,
        extension: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> NameAllocator {
        NameAllocator::new("app")
    }

    #[test]
    fn file_target_with_directory_and_extension() {
        let mut n = names();
        let d = resolve("styles/app.css", true, Group::CSS, "public", &mut n);
        assert_eq!(
            d,
            DestinationSpec {
                directory: "styles".into(),
                file: "app.css".into(),
                base_name: "app".into(),
                extension: "css".into(),
            }
        );
    }

    #[test]
    fn file_target_trailing_slash_generates_name_with_group_extension() {
        let mut n = names();
        let d = resolve("styles/", true, Group::CSS, "public", &mut n);
        assert_eq!(d.directory, "styles");
        assert_eq!(d.base_name, "app");
        assert_eq!(d.file, "app.css");
        assert_eq!(d.extension, "css");

        let d2 = resolve("styles/", true, Group::CSS, "public", &mut n);
        assert_eq!(d2.file, "app2.css");
    }

    #[test]
    fn file_target_empty_falls_back_to_root() {
        let mut n = names();
        let d = resolve("", true, Group::JS, "public", &mut n);
        assert_eq!(d.directory, "public");
        assert_eq!(d.file, "app.js");
    }

    #[test]
    fn bare_file_name_lands_in_root() {
        let mut n = names();
        let d = resolve("bundle.js", true, Group::JS, "public", &mut n);
        assert_eq!(d.directory, "public");
        assert_eq!(d.file, "bundle.js");
        assert_eq!(d.base_name, "bundle");
    }

    #[test]
    fn leading_slash_only_collapses_to_root() {
        let mut n = names();
        let d = resolve("/app.css", true, Group::CSS, "public", &mut n);
        assert_eq!(d.directory, "public");
        assert_eq!(d.file, "app.css");
    }

    #[test]
    fn file_without_extension() {
        let mut n = names();
        let d = resolve("dist/LICENSE", true, Group::FILES, "public", &mut n);
        assert_eq!(d.base_name, "LICENSE");
        assert_eq!(d.extension, "");
        assert_eq!(d.file, "LICENSE");
    }

    #[test]
    fn multiple_dots_split_on_last() {
        let mut n = names();
        let d = resolve("js/app.min.js", true, Group::JS, "public", &mut n);
        assert_eq!(d.base_name, "app.min");
        assert_eq!(d.extension, "js");
    }

    #[test]
    fn trailing_dot_is_not_an_extension() {
        assert_eq!(split_extension("app."), ("app.", ""));
        assert_eq!(split_extension(".htaccess"), ("", "htaccess"));
    }

    #[test]
    fn generated_file_in_group_without_extension() {
        let mut n = names();
        let d = resolve("out/", true, Group::FILES, "public", &mut n);
        assert_eq!(d.file, "app");
        assert_eq!(d.extension, "");
    }

    #[test]
    fn directory_target_empty_uses_root_and_counter() {
        let mut n = names();
        let d = resolve("", false, Group::FILES, "public", &mut n);
        assert_eq!(d.directory, "public");
        assert_eq!(d.base_name, "app");
        assert!(d.file.is_empty());
        assert!(d.extension.is_empty());

        let d2 = resolve("", false, Group::FILES, "public", &mut n);
        assert_eq!(d2.base_name, "app2");
    }

    #[test]
    fn directory_target_trailing_slash_is_stripped() {
        let mut n = names();
        let d = resolve("public/img/", false, Group::FILES, "public", &mut n);
        assert_eq!(d.directory, "public/img");
        assert_eq!(d.base_name, "app");
    }

    #[test]
    fn directory_target_takes_last_segment_as_name() {
        let mut n = names();
        let d = resolve("public/fonts", false, Group::FILES, "public", &mut n);
        assert_eq!(d.directory, "public/fonts");
        assert_eq!(d.base_name, "fonts");
    }

    #[test]
    fn output_path_joins_directory_and_file() {
        let mut n = names();
        let d = resolve("styles/app.css", true, Group::CSS, "public", &mut n);
        assert_eq!(d.output_path(), "styles/app.css");
        let dir = resolve("img/", false, Group::FILES, "public", &mut n);
        assert_eq!(dir.output_path(), "img");
    }
}
