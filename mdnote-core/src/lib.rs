//! mdnote core - Markdown editing engine, independent of any UI
//!
//! This crate contains:
//! - Toggle-aware text transforms over (text, selection) snapshots
//! - Fenced code block detection shared by every structural scan
//! - Heading outline with anchor slugs, task list line index and toggling
//! - Image placeholder store
//! - Note editing session with debounced autosave
//! - HTML preview rendering (optional feature)
//! - Configuration management

pub mod actions;
pub mod config;
pub mod doc;
pub mod fence;
pub mod image;
pub mod note;
pub mod selection;
pub mod session;
pub mod tasks;
pub mod toc;
pub mod transform;

#[cfg(feature = "render")]
pub mod render;

// Re-export commonly used types
pub use actions::EditorAction;
pub use config::Config;
pub use doc::Document;
pub use image::ImageStore;
pub use note::{MemoryNoteStore, Note, NoteStore};
pub use selection::Selection;
pub use session::{EditorSession, SyncOutcome};
pub use toc::Heading;
pub use transform::Edit;
