//! Nested-table location under the two Scipion naming schemes.
//!
//! # Responsibility
//! - Compute the physical `(classes, objects)` table-name pair for a nested
//!   scope, given its parent key.
//!
//! # Invariants
//! - Pure and deterministic; no I/O.
//! - The two naming schemes are not interchangeable: per-tilt-series tables
//!   are keyed by the parent's string id, per-CTF-series tables by the
//!   parent's 1-based position in the master enumeration order. Callers pick
//!   the variant matching their entity family.

/// Master schema-mapping table present in every store.
pub const CLASSES_TBL: &str = "Classes";
/// Master object-record table present in every store.
pub const OBJECTS_TBL: &str = "Objects";
/// Master free-form key/value table; present but unused by the conversion.
pub const PROPERTIES_TBL: &str = "Properties";

/// Parent key of a nested scope, tagged by naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKey {
    /// Tables named `{id}_Classes` / `{id}_Objects` (per-tilt-series).
    IdKeyed(String),
    /// Tables named `id{i}_Classes` / `id{i}_Objects`, with `i` the 1-based
    /// row position within the master enumeration (per-CTF-series). The
    /// producing application guarantees that enumeration order matches the
    /// numbering of the sub-tables; that contract cannot be verified here.
    IndexKeyed(usize),
}

/// Physical table-name pair of one nested scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePair {
    pub classes: String,
    pub objects: String,
}

/// Returns the table-name pair for a nested scope.
pub fn locate(key: &ScopeKey) -> TablePair {
    match key {
        ScopeKey::IdKeyed(id) => TablePair {
            classes: format!("{id}_{CLASSES_TBL}"),
            objects: format!("{id}_{OBJECTS_TBL}"),
        },
        ScopeKey::IndexKeyed(position) => TablePair {
            classes: format!("id{position}_{CLASSES_TBL}"),
            objects: format!("id{position}_{OBJECTS_TBL}"),
        },
    }
}

/// Double-quotes an identifier for use in SQL text, escaping embedded
/// quotes. Table names here come from the store itself (ids, numbered
/// scopes), not from a trusted static list.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
