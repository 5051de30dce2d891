use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::{mapref::entry::Entry, DashMap};
use futures::future::{BoxFuture, FutureExt, Shared};

/// Result of reading a file once, shared by every fragment carved out of it.
pub type SharedContent = Result<Arc<[u8]>, Arc<io::Error>>;

/// Supplies the raw bytes of a file.
pub trait ContentReader: Send + Sync {
    fn read(&self, path: &Path) -> BoxFuture<'static, io::Result<Vec<u8>>>;
}

/// Reads files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read(&self, path: &Path) -> BoxFuture<'static, io::Result<Vec<u8>>> {
        let path = path.to_path_buf();
        async move { tokio::fs::read(path).await }.boxed()
    }
}

/// The content behind one physical file.
///
/// The read is started lazily on the first await and runs at most once.
pub struct VirtualContentEntry {
    kind: String,
    path: PathBuf,
    content: Shared<BoxFuture<'static, SharedContent>>,
}

impl VirtualContentEntry {
    fn new(path: &Path, read: BoxFuture<'static, io::Result<Vec<u8>>>) -> Self {
        let kind = match path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy()),
            None => ".js".to_string(),
        };
        let content = read
            .map(|result| result.map(Arc::<[u8]>::from).map_err(Arc::new))
            .boxed()
            .shared();
        Self {
            kind,
            path: path.to_path_buf(),
            content,
        }
    }

    /// The file extension, including the leading dot.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn content(&self) -> SharedContent {
        self.content.clone().await
    }
}

/// Build-scoped registry of file contents, keyed by `{scheme}:{absolute path}`.
pub struct ContentRegistry {
    entries: DashMap<String, Arc<VirtualContentEntry>>,
    reader: Arc<dyn ContentReader>,
}

impl ContentRegistry {
    pub fn new(reader: Arc<dyn ContentReader>) -> Self {
        Self {
            entries: DashMap::new(),
            reader,
        }
    }

    pub fn with_fs_reader() -> Self {
        Self::new(Arc::new(FsContentReader))
    }

    /// Registers `path` under `key` unless something is already registered there.
    ///
    /// The first registrant wins; everyone gets the same entry back.
    pub fn register(&self, key: &str, path: &Path) -> Arc<VirtualContentEntry> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(vacant) => {
                tracing::debug!(key, path = %path.display(), "registering virtual content");
                let entry = Arc::new(VirtualContentEntry::new(path, self.reader.read(path)));
                vacant.insert(entry.clone());
                entry
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<VirtualContentEntry>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops `entry` from the registry so the next registration reads the file again.
    ///
    /// Does nothing if `key` has since been re-registered with a different entry.
    pub fn evict(&self, key: &str, entry: &Arc<VirtualContentEntry>) -> bool {
        let removed = self
            .entries
            .remove_if(key, |_, current| Arc::ptr_eq(current, entry))
            .is_some();
        if removed {
            tracing::debug!(key, "evicted virtual content");
        }
        removed
    }
}
