//! Notes, share records, their storage boundary and the service on top.

pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use memory::InMemoryNoteStore;
pub use model::{NewNote, NewSharedNote, Note, NoteDraft, SharedNote};
pub use service::NoteService;
pub use store::NoteStore;
