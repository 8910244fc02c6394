//! Incremental, best-effort type inference and symbol resolution for code
//! completion in Haxe source.
//!
//! The engine answers "what is the type of the expression/variable at this
//! cursor position" over the live, possibly-invalid editor buffer. It never
//! re-parses the file: it reuses the host's symbol model and rescans only the
//! local text window an inference needs. Every resolution path has a defined
//! fallback, the void sentinel or the `Dynamic` type, so no entry point can
//! fail the request.
//!
//! Components:
//! - `evaluator` - expression normalization and evaluation
//! - `inference` - variable type inference (iteration and declaration forms)
//! - `function_type` - structural arrow-type string parsing
//! - `resolver` - constructor, typedef-alias, and implements resolution
//! - `styles` - regex-literal and string-interpolation position checks

use hxc_model::{BufferCursor, ResolveContext};

pub mod evaluator;
pub mod function_type;
pub mod inference;
pub mod resolver;
pub mod styles;

pub use function_type::{function_type_to_member, member_as_function};

/// One completion/inference request's view of the world: the live buffer and
/// the host's symbol model. Cheap to construct; hosts build one per request
/// on their single edit thread.
pub struct CompletionEngine<'a> {
    pub(crate) buffer: &'a dyn BufferCursor,
    pub(crate) ctx: &'a dyn ResolveContext,
}

impl<'a> CompletionEngine<'a> {
    pub fn new(buffer: &'a dyn BufferCursor, ctx: &'a dyn ResolveContext) -> CompletionEngine<'a> {
        CompletionEngine { buffer, ctx }
    }
}

#[cfg(test)]
pub mod test_fixtures;
