//! Regenerates machine-owned `## SKILLS` / `## COMMANDS` sections inside a
//! human-edited markdown document without touching anything around them.
//!
//! [`embedding`] splits, regenerates, and reassembles the document;
//! [`safety`] wraps every write in backup, atomic replace, validation, and
//! rollback.
pub mod config;
pub mod embedding;
pub mod error;
pub mod records;
pub mod safety;
pub mod util;

pub use error::{EmbedError, Result};
pub use records::{CommandRecord, Location, RecordSet, SkillRecord};
