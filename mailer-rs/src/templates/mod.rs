//! Template Source Reader
//!
//! Enumerates HTML email templates from one of two sources sharing the
//! same record shape and skip rules:
//!
//! - [`RootedPathSource`]: server-side scan of a configured path
//! - [`UserGrantedSource`]: scan of a directory the operator grants
//!   interactively

pub mod granted;
pub mod rooted;
pub mod rules;
pub mod source;
pub mod types;

pub use granted::{
    DirectoryHandle, DirectoryPicker, EntryKind, HandleEntry, LocalDirectoryHandle, PickOutcome,
    PromptPicker, UnsupportedPicker, UserGrantedSource,
};
pub use rooted::{ConfiguredTemplates, RootedPathSource};
pub use source::TemplateSource;
pub use types::{TemplateListing, TemplateRecord};
