pub mod format;
pub mod note;
pub mod store;
pub mod validate;

pub use format::{compose_document, format_timestamp, generate_filename, generate_frontmatter};
pub use note::{ChatRole, ChatTurn, NoteDraft, NoteMetadata};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use validate::{NoteValidation, validate_note};
