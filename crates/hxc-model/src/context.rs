//! Resolution interface and language configuration.

use crate::expr::{EvalFlags, ExprContext, ExprResult};
use crate::model::{ClassModel, FileModel, MemberModel};

/// Language-level names and switches the engine parameterizes over.
///
/// The defaults describe Haxe; hosts for a dialect can override individual
/// keys.
#[derive(Debug, Clone)]
pub struct LanguageFeatures {
    /// The "no type" key (`Void`).
    pub void_key: String,
    /// The dynamic/untyped built-in type (`Dynamic`).
    pub dynamic_key: String,
    /// The built-in string type.
    pub string_key: String,
    /// The built-in integer type.
    pub integer_key: String,
    /// The built-in float type.
    pub float_key: String,
    /// The built-in boolean type.
    pub boolean_key: String,
    /// The built-in array type (unparameterized name).
    pub array_key: String,
    /// The built-in map type (unparameterized name).
    pub map_key: String,
    /// The built-in regex type the `#RegExp` literal marker resolves to.
    pub regex_key: String,
    /// The untyped-escape keyword.
    pub untyped_key: String,
    /// Whether string interpolation (`'${expr}'`) exists at all.
    pub has_string_interpolation: bool,
    /// Quote kinds that allow interpolation.
    pub string_interpolation_quotes: String,
}

impl Default for LanguageFeatures {
    fn default() -> LanguageFeatures {
        LanguageFeatures {
            void_key: "Void".into(),
            dynamic_key: "Dynamic".into(),
            string_key: "String".into(),
            integer_key: "Int".into(),
            float_key: "Float".into(),
            boolean_key: "Bool".into(),
            array_key: "Array".into(),
            map_key: "Map".into(),
            regex_key: "EReg".into(),
            untyped_key: "untyped".into(),
            has_string_interpolation: true,
            string_interpolation_quotes: "'".into(),
        }
    }
}

impl LanguageFeatures {
    /// Membership in the token/identifier character class.
    pub fn is_identifier_char(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }
}

/// Read access to the host's symbol model, plus the per-request cursor state
/// (current file/class/member).
///
/// Resolution never fails: a miss yields the void sentinel, and the engine
/// degrades to the dynamic type rather than raising an error.
pub trait ResolveContext {
    fn features(&self) -> &LanguageFeatures;

    /// File the completion request originates from.
    fn current_file(&self) -> &FileModel;

    /// Class enclosing the cursor.
    fn current_class(&self) -> &ClassModel;

    /// Function or field enclosing the cursor, when inside one.
    fn current_member(&self) -> Option<&MemberModel>;

    /// Resolve a type by name in the scope of `in_file`. Returns the void
    /// sentinel on a miss.
    fn resolve_type(&self, name: &str, in_file: Option<&FileModel>) -> ClassModel;

    /// Resolve a single token (a literal, a cast/type-check form, or a bare
    /// type name) to a type. Returns the void sentinel on a miss.
    fn resolve_token(&self, token: &str, in_file: Option<&FileModel>) -> ClassModel;

    /// The generic dot-path resolver the evaluator delegates to after
    /// normalization.
    fn resolve_expression(
        &self,
        expression: &str,
        context: &ExprContext,
        in_file: Option<&FileModel>,
        in_class: &ClassModel,
        flags: EvalFlags,
    ) -> ExprResult;

    /// Every type the project's index knows about.
    fn all_project_types(&self) -> Vec<ClassModel>;

    /// One extends hop: the resolved supertype of `of_type`, or the void
    /// sentinel at the top of the chain. Memoization belongs to the store;
    /// callers walking a chain carry their own visited set.
    fn resolve_extends(&self, of_type: &ClassModel) -> ClassModel {
        match &of_type.extends_type {
            Some(extends) if !extends.is_empty() => {
                self.resolve_type(extends, of_type.in_file.as_deref())
            }
            _ => ClassModel::void(),
        }
    }
}
