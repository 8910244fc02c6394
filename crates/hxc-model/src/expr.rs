//! Per-request expression state.
//!
//! An `ExprContext` is created for a single completion/inference request and
//! discarded when the request completes; it never outlives the triggering
//! buffer interaction.

use bitflags::bitflags;

use crate::model::{ClassModel, MemberModel};

bitflags! {
    /// Evaluation mode for a resolution request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EvalFlags: u8 {
        /// The request feeds a completion list (as opposed to a silent
        /// inference pass).
        const COMPLETE = 1 << 0;
        /// Resolve the expression as a callable (calltip request).
        const AS_FUNCTION = 1 << 1;
        /// Filter members by visibility from the requesting class.
        const FILTER_VISIBILITY = 1 << 2;
    }
}

/// The in-flight state of a single completion/inference request.
#[derive(Debug, Clone, Default)]
pub struct ExprContext {
    /// Raw candidate expression text.
    pub value: String,
    /// Cursor position in the buffer.
    pub position: usize,
    /// Anchor position of the sub-expression under the cursor.
    pub position_expression: usize,
    /// Enclosing function, for parameter lookups.
    pub context_function: Option<MemberModel>,
    /// Local variables visible at the cursor, in declaration order.
    pub local_vars: Vec<MemberModel>,
    /// Placeholder-numbered fragments (`#0~`, `#1~`, ...) produced by the
    /// upstream tokenizer for nested bracketed/parenthesized groups.
    /// Indices are zero-based and dense.
    pub sub_expressions: Option<Vec<String>>,
    /// Separator token that introduced the current binding (`=`, `in`, ...).
    pub separator: String,
    /// Word immediately left of the expression.
    pub word_before: String,
}

/// Outcome of a resolution request: a type, and/or a matched member, and/or
/// the class the expression was resolved from. `is_null` is the "no result"
/// sentinel the host interprets as "nothing to complete".
#[derive(Debug, Clone, Default)]
pub struct ExprResult {
    /// Resolved type, when one was found.
    pub ty: Option<ClassModel>,
    /// Matched member, when the expression named one.
    pub member: Option<MemberModel>,
    /// Class the resolution was anchored in.
    pub in_class: Option<ClassModel>,
    /// The dot-path that was resolved, as text.
    pub path: String,
}

impl ExprResult {
    pub fn is_null(&self) -> bool {
        self.ty.is_none() && self.member.is_none()
    }

    pub fn with_type(ty: ClassModel) -> ExprResult {
        ExprResult {
            ty: Some(ty),
            ..Default::default()
        }
    }
}
