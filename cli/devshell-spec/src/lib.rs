//! Derive development shells from package build specifications.
//!
//!```text
//!  base Specification ──┐
//!                       │
//!  ShellOverlay ────────┼──► ShellSpecBuilder::build ──► shell Specification
//!   ├─ packages         │      ├─ resolve name
//!   ├─ inputsFrom ──────┘      ├─ merge the four dependency fields
//!   └─ attrs                   ├─ fold packages into nativeBuildInputs
//!                              ├─ concatenate shell hooks
//!                              └─ pin src / phases / buildPhase
//! ```
//!
//! A [ShellDocument] is the on-disk form: a TOML file declaring named
//! specifications that refer to each other by name, plus a `[shell]` table
//! describing the overlay.

pub mod builder;
pub mod document;
pub mod merge;
pub mod overlay;
pub mod reference;
pub mod script;
pub mod specification;

pub use builder::ShellSpecBuilder;
pub use document::ShellDocument;
pub use merge::{DependencyField, Dependencies};
pub use overlay::ShellOverlay;
pub use reference::SpecRef;
pub use specification::{Attrs, Specification};

/// Name used for a shell when neither the overlay nor the base names it.
pub const DEFAULT_SHELL_NAME: &str = "nix-shell";
/// Suffix appended to the base specification's name to name its shell.
pub const DEV_SHELL_SUFFIX: &str = "-dev-shell";

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    // =========================================================================
    // Loading shell documents
    // =========================================================================
    /// We failed to read a shell document from disk.
    #[error("failed to read shell document: {0}")]
    IORead(#[source] std::io::Error),

    /// The provided string failed to parse as a shell document.
    #[error("shell document was not valid: {0}")]
    ParseToml(#[source] toml::de::Error),

    #[error("'{from}' refers to unknown specification '{name}' in '{field}'")]
    UnknownReference {
        from: String,
        field: String,
        name: String,
    },

    #[error("specifications refer to each other in a cycle: {}", .0.join(" -> "))]
    ReferenceCycle(Vec<String>),

    // =========================================================================
    // Rendering specifications
    // =========================================================================
    #[error("failed to serialize specification as JSON: {0}")]
    SerializeJson(#[source] serde_json::Error),

    #[error("failed to serialize specification as TOML: {0}")]
    SerializeToml(#[source] toml::ser::Error),
}
