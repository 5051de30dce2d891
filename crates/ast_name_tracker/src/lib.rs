//! Scope-aware tracking of the names a piece of syntax references but does
//! not declare itself.

mod visitor;

pub use visitor::{find_escaping_names, find_free_names, VarID, VariableScope};
