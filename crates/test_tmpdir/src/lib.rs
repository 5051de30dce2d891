use path_slash::PathBufExt;
use std::{
    collections::BTreeMap,
    fs,
    io::Error,
    path::{Path, PathBuf},
};

/// A temporary directory of source files, removed when dropped.
///
/// Paths handed out by [`TmpDir::root`] and [`TmpDir::root_join`] are
/// canonical, so they compare equal to paths produced by resolvers that
/// canonicalize (e.g. `/tmp` vs `/private/tmp` on macOS).
pub struct TmpDir {
    tmp_root: tempfile::TempDir,
    canonical_root: PathBuf,
}

/// Builds a [`TmpDir`] from `"relative/path" => "content"` pairs.
#[macro_export]
macro_rules! test_tmpdir(
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut m = ::std::collections::BTreeMap::new();
            $(
                m.insert(String::from($key), String::from($value));
            )+

            $crate::TmpDir::new_with_content(&m)
        }
    };
);

impl Default for TmpDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TmpDir {
    pub fn new() -> TmpDir {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let canonical_root =
            fs::canonicalize(root.path()).expect("failed to canonicalize temp dir");
        TmpDir {
            tmp_root: root,
            canonical_root,
        }
    }

    pub fn new_with_content(content: &BTreeMap<String, String>) -> TmpDir {
        let out = Self::new();
        out.write_batch(content)
            .expect("failed to write temp dir content");
        out
    }

    pub fn write_batch(&self, content: &BTreeMap<String, String>) -> Result<(), Error> {
        for (path, body) in content {
            self.write_file(path, body)?;
        }
        Ok(())
    }

    /// Writes one file, creating its parent directories.
    pub fn write_file(&self, path: &str, body: &str) -> Result<PathBuf, Error> {
        let target = self.root_join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, body)?;
        Ok(target)
    }

    pub fn root(&self) -> &Path {
        &self.canonical_root
    }

    /// The directory backing this fixture, as handed out by `tempfile`.
    pub fn raw_root(&self) -> &Path {
        self.tmp_root.path()
    }

    pub fn root_join<S: AsRef<str>>(&self, other: S) -> PathBuf {
        self.canonical_root.join(PathBuf::from_slash(other))
    }
}
