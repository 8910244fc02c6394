//! Foundational types for the hxc completion engine.
//!
//! This crate provides the pieces shared by every component:
//! - The symbol model (`ClassModel`, `MemberModel`, `FileModel`, `FlagType`)
//! - Expression context/result types (`ExprContext`, `ExprResult`, `EvalFlags`)
//! - The editor-buffer interface (`BufferCursor`) plus an in-memory
//!   implementation (`TextBuffer`) for hosts and tests
//! - The resolution interface (`ResolveContext`, `LanguageFeatures`) and a
//!   plain in-memory implementation (`ModelStore`)

// Flag sets for types and members
pub mod flags;
pub use flags::FlagType;

// Symbol model entities
pub mod model;
pub use model::{ClassModel, FileModel, MemberModel};

// Per-request expression state
pub mod expr;
pub use expr::{EvalFlags, ExprContext, ExprResult};

// Editor buffer point-queries
pub mod buffer;
pub use buffer::{BufferCursor, TextBuffer};

// Resolution interface and language configuration
pub mod context;
pub use context::{LanguageFeatures, ResolveContext};

// In-memory symbol store
pub mod store;
pub use store::ModelStore;
