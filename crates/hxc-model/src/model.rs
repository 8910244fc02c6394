//! Symbol-model entities.
//!
//! Entities are owned by the host's symbol store and persist across many
//! completion requests. They use value semantics throughout: whenever a name
//! or type must be rewritten for one request (renaming an inherited
//! constructor, stripping an optional-parameter marker), the member is cloned
//! first so the shared entry is never corrupted. The only in-place mutation
//! the engine performs on a shared entity is the cached type/flags write-back
//! after inference.

use crate::flags::FlagType;

/// A source file in the symbol model.
///
/// `package` and `module` identify where the file's declarations live;
/// `members` holds file-level declarations (and, for the locals projection
/// built per completion request, the bindings visible at the cursor).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileModel {
    /// Path of the file as the host knows it.
    pub file_name: String,
    /// Declared package, empty for the root package.
    pub package: String,
    /// Module name (the file stem for single-module files).
    pub module: String,
    /// File-level members, ordered by declaration line.
    pub members: Vec<MemberModel>,
}

impl FileModel {
    /// Insert `member` keeping `members` ordered by `line_from`, replacing
    /// any previous member of the same name.
    pub fn merge_by_line(&mut self, member: MemberModel) {
        self.members.retain(|it| it.name != member.name);
        let at = self
            .members
            .iter()
            .position(|it| it.line_from > member.line_from)
            .unwrap_or(self.members.len());
        self.members.insert(at, member);
    }
}

/// A named, typed symbol: field, method, constructor, or parameter.
///
/// `type_name` is a type *string*, not a resolved entity; member types may
/// themselves be structural arrow types such as `Int->String`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemberModel {
    pub name: String,
    /// Declared or inferred type string. For functions this is the return
    /// type; parameters are listed separately.
    pub type_name: Option<String>,
    pub flags: FlagType,
    /// First line of the declaration.
    pub line_from: i32,
    /// Last line of the declaration.
    pub line_to: i32,
    /// Parameter list, for functions.
    pub parameters: Vec<MemberModel>,
    /// Default value text, for parameters.
    pub value: Option<String>,
    /// Owning file, when known.
    pub in_file: Option<Box<FileModel>>,
}

impl MemberModel {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, flags: FlagType) -> Self {
        let type_name: String = type_name.into();
        MemberModel {
            name: name.into(),
            type_name: if type_name.is_empty() { None } else { Some(type_name) },
            flags,
            ..Default::default()
        }
    }

    /// The declared type string, or `""` when the member is untyped.
    pub fn type_str(&self) -> &str {
        self.type_name.as_deref().unwrap_or("")
    }
}

/// A resolvable named type: class, interface, typedef, or abstract.
///
/// The distinguished void instance (`ClassModel::void()`) represents
/// "no type / unresolved"; `is_void` is the universal sentinel check and the
/// termination condition for every chain traversal.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassModel {
    /// Name within the module, possibly carrying generic arguments
    /// (`Array<Int>`). Empty only for the void sentinel.
    pub name: String,
    pub flags: FlagType,
    /// Extends-clause target as written, unresolved.
    pub extends_type: Option<String>,
    /// Generic type-parameter list: the declared parameters on a template
    /// (`T`, or `K,V`), the bound arguments on a parameterized instance.
    pub index_type: Option<String>,
    /// Members in declaration order.
    pub members: Vec<MemberModel>,
    pub line_from: i32,
    pub line_to: i32,
    /// Owning file, when known.
    pub in_file: Option<Box<FileModel>>,
}

impl ClassModel {
    /// The "no type / unresolved" sentinel.
    pub fn void() -> ClassModel {
        ClassModel::default()
    }

    pub fn is_void(&self) -> bool {
        self.name.is_empty()
    }

    /// Last dot-separated segment of the name, generic arguments excluded:
    /// `haxe.ds.StringMap<Int>` yields `StringMap`.
    pub fn simple_name(&self) -> &str {
        let base = match self.name.find('<') {
            Some(at) => &self.name[..at],
            None => &self.name,
        };
        base.rsplit('.').next().unwrap_or(base)
    }

    /// Package-qualified display name.
    pub fn qualified_name(&self) -> String {
        match &self.in_file {
            Some(file) if !file.package.is_empty() => format!("{}.{}", file.package, self.name),
            _ => self.name.clone(),
        }
    }

    /// Find a member by name. A non-empty `mask` additionally requires every
    /// bit of `mask` on the member.
    pub fn search_member(&self, name: &str, mask: FlagType) -> Option<&MemberModel> {
        self.members
            .iter()
            .find(|it| it.name == name && (mask.is_empty() || it.flags.contains(mask)))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|it| it.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_sentinel() {
        let void = ClassModel::void();
        assert!(void.is_void());
        let mut int = ClassModel::void();
        int.name = "Int".into();
        assert!(!int.is_void());
    }

    #[test]
    fn test_simple_name_strips_package_and_generics() {
        let mut cls = ClassModel::void();
        cls.name = "haxe.ds.StringMap<Int>".into();
        assert_eq!(cls.simple_name(), "StringMap");
        cls.name = "Array".into();
        assert_eq!(cls.simple_name(), "Array");
    }

    #[test]
    fn test_search_member_honors_flag_mask() {
        let mut cls = ClassModel::void();
        cls.name = "Foo".into();
        cls.members.push(MemberModel::new("Foo", "Foo", FlagType::FUNCTION));
        assert!(cls.search_member("Foo", FlagType::CONSTRUCTOR).is_none());
        cls.members
            .push(MemberModel::new("Foo", "Foo", FlagType::FUNCTION | FlagType::CONSTRUCTOR));
        assert!(cls.search_member("Foo", FlagType::CONSTRUCTOR).is_some());
    }

    #[test]
    fn test_merge_by_line_replaces_and_keeps_order() {
        let mut file = FileModel::default();
        let mut a = MemberModel::new("a", "Int", FlagType::VARIABLE);
        a.line_from = 5;
        let mut b = MemberModel::new("b", "String", FlagType::VARIABLE);
        b.line_from = 2;
        file.merge_by_line(a.clone());
        file.merge_by_line(b);
        assert_eq!(file.members[0].name, "b");
        assert_eq!(file.members[1].name, "a");

        a.type_name = Some("Float".into());
        file.merge_by_line(a);
        assert_eq!(file.members.len(), 2);
        assert_eq!(file.members[1].type_str(), "Float");
    }
}
