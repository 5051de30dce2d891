//! Splits ECMAScript modules into fragments that each provide one export.
//!
//! A fragment refers to every binding it does not define through an import
//! whose source is an *address*: a string that names the file and the export
//! wanted from it. The host hands such addresses back to [`Splitter::load`],
//! which produces that fragment in turn, so the fragment graph of a file is
//! only ever expanded as far as the build actually reaches.

mod address;
mod assemble;
mod classify;
mod config;
mod entry;
mod error;
mod export_name;
mod exports;
mod prune;
mod registry;
mod resolve;
mod side_effects;
mod splitter;
mod walker;

pub use address::{registry_key, ImportAddress};
pub use config::{SplitterConfig, SplitterJSONConfig, DEFAULT_MODULE_EXTENSIONS, DEFAULT_SCHEME};
pub use error::SplitError;
pub use export_name::{ExportRequest, RequestedExport};
pub use registry::{ContentReader, ContentRegistry, FsContentReader, SharedContent, VirtualContentEntry};
pub use resolve::{
    create_node_resolver, ExtensionProbe, FullySpecifiedResolver, ModuleKindProbe, NodeResolver,
};
pub use splitter::Splitter;
