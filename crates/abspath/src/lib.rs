use path_clean::PathClean;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Base path {0} is not absolute")]
    BasePathNotAbsolute(PathBuf),
}

/// Joins `path` onto an absolute `base`, normalising `.` and `..` segments.
///
/// If `path` is already absolute it is cleaned and returned as-is.
pub fn join_abspath(base: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<PathBuf, Error> {
    let base = base.as_ref();
    let path = path.as_ref();
    if !base.is_absolute() {
        return Err(Error::BasePathNotAbsolute(base.to_path_buf()));
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
    .clean();

    Ok(absolute_path)
}

/// True for import specifiers that name a file directly (`./x`, `../x`, `/x`, `C:\x`),
/// as opposed to bare package specifiers (`react`, `@scope/pkg/sub`).
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || Path::new(specifier).is_absolute() || specifier.starts_with('/')
}

/// The directory a file lives in, used as the resolution context for its imports.
pub fn context_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) => parent.to_path_buf(),
        None => file.to_path_buf(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn joins_relative_segments() {
        let joined = join_abspath("/repo/src", "../lib/./util.js").unwrap();
        assert_eq!(joined, PathBuf::from("/repo/lib/util.js"));
    }

    #[test]
    fn rejects_relative_base() {
        assert!(matches!(
            join_abspath("repo/src", "./a.js"),
            Err(Error::BasePathNotAbsolute(_))
        ));
    }

    #[test]
    fn classifies_specifiers() {
        assert!(is_path_specifier("./a.js"));
        assert!(is_path_specifier("../a"));
        assert!(is_path_specifier("/abs/a.js"));
        assert!(!is_path_specifier("react"));
        assert!(!is_path_specifier("@scope/pkg"));
    }

    #[test]
    fn context_of_file_is_its_directory() {
        assert_eq!(
            context_dir(Path::new("/repo/src/a.js")),
            PathBuf::from("/repo/src")
        );
    }
}
