//! In-memory symbol store.
//!
//! `ModelStore` is the reference `ResolveContext` implementation: a named-node
//! lookup over the project's type entities, with on-demand generic
//! parameterization and a small dot-path resolver. Hosts with a richer index
//! can substitute their own implementation; the engine only sees the trait.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::context::{LanguageFeatures, ResolveContext};
use crate::expr::{EvalFlags, ExprContext, ExprResult};
use crate::flags::FlagType;
use crate::model::{ClassModel, FileModel, MemberModel};

#[derive(Debug)]
pub struct ModelStore {
    types: FxHashMap<String, ClassModel>,
    features: LanguageFeatures,
    current_file: FileModel,
    current_class: ClassModel,
    current_member: Option<MemberModel>,
}

impl ModelStore {
    pub fn new() -> ModelStore {
        ModelStore {
            types: FxHashMap::default(),
            features: LanguageFeatures::default(),
            current_file: FileModel::default(),
            current_class: ClassModel::void(),
            current_member: None,
        }
    }

    pub fn with_features(features: LanguageFeatures) -> ModelStore {
        ModelStore {
            features,
            ..ModelStore::new()
        }
    }

    /// Register or refresh a type entity, keyed by its name.
    pub fn add_type(&mut self, class: ClassModel) {
        self.types.insert(class.name.clone(), class);
    }

    pub fn set_current_file(&mut self, file: FileModel) {
        self.current_file = file;
    }

    pub fn set_current_class(&mut self, class: ClassModel) {
        self.current_class = class;
    }

    pub fn set_current_member(&mut self, member: Option<MemberModel>) {
        self.current_member = member;
    }

    /// Bind a template's declared type parameters to `args`, positionally,
    /// rewriting member type strings.
    fn parameterize(&self, template: &ClassModel, base: &str, args: &str) -> ClassModel {
        let mut class = template.clone();
        class.name = format!("{}<{}>", base, args);
        let declared: Vec<String> = match &template.index_type {
            Some(params) => split_top_level(params, ',')
                .into_iter()
                .map(|p| p.trim().to_string())
                .collect(),
            None => Vec::new(),
        };
        let bound: Vec<String> = split_top_level(args, ',')
            .into_iter()
            .map(|a| a.trim().to_string())
            .collect();
        class.index_type = Some(args.trim().to_string());
        for (param, arg) in declared.iter().zip(bound.iter()) {
            for member in &mut class.members {
                if let Some(ty) = &member.type_name {
                    member.type_name = Some(replace_type_param(ty, param, arg));
                }
                for p in &mut member.parameters {
                    if let Some(ty) = &p.type_name {
                        p.type_name = Some(replace_type_param(ty, param, arg));
                    }
                }
            }
            if let Some(extends) = &class.extends_type {
                class.extends_type = Some(replace_type_param(extends, param, arg));
            }
        }
        trace!(name = %class.name, "parameterized template");
        class
    }

    fn lookup(&self, name: &str) -> Option<&ClassModel> {
        self.types.get(name).or_else(|| {
            // qualified miss: retry on the last dot segment
            name.rsplit('.').next().and_then(|tail| {
                if tail == name {
                    None
                } else {
                    self.types.get(tail)
                }
            })
        })
    }

    /// Resolve the head of a dot path: locals, parameters, `this`/`super`,
    /// enclosing-class members, then type names and literal tokens.
    fn resolve_head(
        &self,
        ident: &str,
        full_part: &str,
        suffix: PathSuffix,
        context: &ExprContext,
        in_file: Option<&FileModel>,
        in_class: &ClassModel,
        result: &mut ExprResult,
    ) -> ClassModel {
        if ident == "this" {
            return in_class.clone();
        }
        if ident == "super" {
            return self.resolve_extends(in_class);
        }
        let effective = |member: &MemberModel| -> String {
            if suffix == PathSuffix::Call && member.type_str().contains("->") {
                arrow_return_type(member.type_str()).to_string()
            } else {
                member.type_str().to_string()
            }
        };
        // most recent declaration wins
        if let Some(local) = context
            .local_vars
            .iter()
            .rev()
            .find(|it| it.name == ident)
        {
            let ty = self.resolve_type(&effective(local), in_file);
            result.member = Some(local.clone());
            return ty;
        }
        if let Some(func) = &context.context_function {
            if let Some(param) = func
                .parameters
                .iter()
                .find(|it| it.name.trim_start_matches('?') == ident)
            {
                let ty = self.resolve_type(&effective(param), in_file);
                result.member = Some(param.clone());
                return ty;
            }
        }
        if let Some(member) = self.find_inherited_member(in_class, ident) {
            let ty = self.resolve_type(&effective(&member), in_file);
            result.member = Some(member);
            return ty;
        }
        let as_type = self.resolve_type(ident, in_file);
        if !as_type.is_void() {
            return as_type;
        }
        self.resolve_token(full_part, in_file)
    }

    /// Member lookup walking the extends chain, cycle-guarded.
    fn find_inherited_member(&self, of_class: &ClassModel, name: &str) -> Option<MemberModel> {
        let mut owner = of_class.clone();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        while !owner.is_void() && visited.insert(owner.name.clone()) {
            if let Some(member) = owner.search_member(name, FlagType::empty()) {
                return Some(member.clone());
            }
            owner = self.resolve_extends(&owner);
        }
        None
    }
}

impl ResolveContext for ModelStore {
    fn features(&self) -> &LanguageFeatures {
        &self.features
    }

    fn current_file(&self) -> &FileModel {
        &self.current_file
    }

    fn current_class(&self) -> &ClassModel {
        &self.current_class
    }

    fn current_member(&self) -> Option<&MemberModel> {
        self.current_member.as_ref()
    }

    fn resolve_type(&self, name: &str, in_file: Option<&FileModel>) -> ClassModel {
        let name = name.trim();
        if name.is_empty() {
            return ClassModel::void();
        }
        // Null<T> is transparent for completion purposes
        if let Some(inner) = name.strip_prefix("Null<").and_then(|s| s.strip_suffix('>')) {
            return self.resolve_type(inner, in_file);
        }
        if let Some(lt) = name.find('<') {
            if name.ends_with('>') {
                let base = &name[..lt];
                let args = &name[lt + 1..name.len() - 1];
                return match self.lookup(base) {
                    Some(template) => self.parameterize(template, base, args),
                    None => ClassModel::void(),
                };
            }
        }
        match self.lookup(name) {
            Some(class) => class.clone(),
            None => {
                trace!(name, "type not in index");
                ClassModel::void()
            }
        }
    }

    fn resolve_token(&self, token: &str, in_file: Option<&FileModel>) -> ClassModel {
        let token = token.trim();
        if token.is_empty() {
            return ClassModel::void();
        }
        let features = &self.features;
        let first = token.chars().next().unwrap_or('\0');
        match first {
            '[' => {
                // the literal may still be open mid-edit: `["` has no `]`
                let inner = token[1..].strip_suffix(']').unwrap_or(&token[1..]);
                let key = if contains_top_level(inner, "=>") {
                    format!(
                        "{}<{},{}>",
                        features.map_key, features.dynamic_key, features.dynamic_key
                    )
                } else {
                    format!("{}<{}>", features.array_key, features.dynamic_key)
                };
                self.resolve_type(&key, in_file)
            }
            '"' | '\'' => self.resolve_type(&features.string_key, in_file),
            '~' if token.starts_with("~/") => self.resolve_type(&features.regex_key, in_file),
            c if c.is_ascii_digit() => {
                let key = if token.contains('.') {
                    &features.float_key
                } else {
                    &features.integer_key
                };
                self.resolve_type(key, in_file)
            }
            _ => {
                if token == "true" || token == "false" {
                    return self.resolve_type(&features.boolean_key, in_file);
                }
                if let Some(rest) = token.strip_prefix("cast") {
                    let rest = rest.trim_start();
                    if let Some(inner) = rest.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                        // cast(expr, T) carries the target type; a bare cast
                        // expression is untyped
                        return match split_top_level(inner, ',').get(1) {
                            Some(target) => self.resolve_type(target.trim(), in_file),
                            None => self.resolve_type(&features.dynamic_key, in_file),
                        };
                    }
                    if token.starts_with("cast ") {
                        return self.resolve_type(&features.dynamic_key, in_file);
                    }
                }
                if let Some(inner) = token.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                    // (v is T), (v : T), plain parenthesized expression
                    if let Some(at) = find_top_level(inner, " is ") {
                        return self.resolve_type(inner[at + 4..].trim(), in_file);
                    }
                    if let Some(at) = find_top_level(inner, ":") {
                        return self.resolve_type(inner[at + 1..].trim(), in_file);
                    }
                    return self.resolve_token(inner, in_file);
                }
                if let Some(rest) = token.strip_prefix("new ") {
                    let name = match rest.find('(') {
                        Some(at) => &rest[..at],
                        None => rest,
                    };
                    return self.resolve_type(name.trim(), in_file);
                }
                self.resolve_type(token, in_file)
            }
        }
    }

    fn resolve_expression(
        &self,
        expression: &str,
        context: &ExprContext,
        in_file: Option<&FileModel>,
        in_class: &ClassModel,
        _flags: EvalFlags,
    ) -> ExprResult {
        let expression = expression.trim();
        if expression.is_empty() {
            return ExprResult::default();
        }
        if expression.starts_with(|c: char| c.is_ascii_digit()) {
            let ty = self.resolve_token(expression, in_file);
            return if ty.is_void() {
                ExprResult::default()
            } else {
                ExprResult {
                    ty: Some(ty),
                    in_class: Some(in_class.clone()),
                    path: expression.to_string(),
                    ..Default::default()
                }
            };
        }
        let mut result = ExprResult {
            in_class: Some(in_class.clone()),
            path: expression.to_string(),
            ..Default::default()
        };
        let mut ty = ClassModel::void();
        let mut first = true;
        for part in split_dot_path(expression) {
            let part = part.trim();
            // spliced completion anchors (`#`, `#0~`) and the trailing empty
            // segment of `expr.` are transparent
            if part.is_empty() || part.starts_with('#') {
                continue;
            }
            let (ident, suffix) = split_call_suffix(part);
            if first {
                first = false;
                ty = self.resolve_head(ident, part, suffix, context, in_file, in_class, &mut result);
                if ty.is_void() && result.member.is_none() {
                    return ExprResult::default();
                }
            } else {
                let Some(member) = self.find_inherited_member(&ty, ident) else {
                    return ExprResult::default();
                };
                let member_type = if member.type_str().contains("->") && suffix == PathSuffix::Call
                {
                    arrow_return_type(member.type_str()).to_string()
                } else {
                    member.type_str().to_string()
                };
                ty = if member_type.is_empty() {
                    self.resolve_type(&self.features.dynamic_key, in_file)
                } else {
                    self.resolve_type(&member_type, in_file)
                };
                result.member = Some(member);
            }
            if suffix == PathSuffix::Index {
                let element = ty.index_type.clone().unwrap_or_default();
                ty = if element.is_empty() {
                    self.resolve_type(&self.features.dynamic_key, in_file)
                } else {
                    self.resolve_type(&element, in_file)
                };
            }
        }
        if !ty.is_void() {
            result.ty = Some(ty);
        }
        result
    }

    fn all_project_types(&self) -> Vec<ClassModel> {
        let mut all: Vec<ClassModel> = self.types.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

/// Trailing accessor shape of a dot-path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathSuffix {
    None,
    Call,
    Index,
}

fn split_call_suffix(part: &str) -> (&str, PathSuffix) {
    if part.ends_with(')') {
        if let Some(at) = find_top_level_open(part, '(') {
            return (&part[..at], PathSuffix::Call);
        }
    }
    if part.ends_with(']') {
        if let Some(at) = find_top_level_open(part, '[') {
            return (&part[..at], PathSuffix::Index);
        }
    }
    (part, PathSuffix::None)
}

/// First top-level occurrence of an opening bracket kind.
fn find_top_level_open(s: &str, open: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => {
                if depth == 0 && c == open {
                    return Some(i);
                }
                depth += 1;
            }
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split on `sep` ignoring separators nested in `()`, `[]`, `{}`, or `<>`.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            // the `>` of a function arrow is not a closing bracket
            '>' if i > 0 && s.as_bytes()[i - 1] == b'-' => {}
            ')' | ']' | '}' | '>' => depth -= 1,
            _ if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

fn contains_top_level(s: &str, needle: &str) -> bool {
    find_top_level(s, needle).is_some()
}

fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    let bytes = s.as_bytes();
    let nb = needle.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth -= 1,
            _ => {}
        }
        if depth == 0 && bytes[i..].starts_with(nb) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Split a dot path at top-level dots, leaving dots inside brackets, generic
/// arguments, and string literals alone.
fn split_dot_path(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            '.' if depth == 0 => {
                out.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

/// The return segment of a structural arrow type: everything after the last
/// top-level `->`.
fn arrow_return_type(s: &str) -> &str {
    let mut depth = 0i32;
    let bytes = s.as_bytes();
    let mut last = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {
                if depth == 0 {
                    last = Some(i + 1);
                }
            }
            b'>' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    match last {
        Some(at) => s[at..].trim(),
        None => s.trim(),
    }
}

/// Token-boundary substitution of a generic parameter name inside a type
/// string: `T` matches in `Iterator<T>` but not in `TValue`.
fn replace_type_param(type_str: &str, param: &str, arg: &str) -> String {
    if param.is_empty() {
        return type_str.to_string();
    }
    let mut out = String::with_capacity(type_str.len());
    let chars: Vec<char> = type_str.chars().collect();
    let pchars: Vec<char> = param.chars().collect();
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut i = 0;
    while i < chars.len() {
        let matches = chars[i..].starts_with(&pchars[..])
            && (i == 0 || !is_ident(chars[i - 1]))
            && chars
                .get(i + pchars.len())
                .is_none_or(|&c| !is_ident(c));
        if matches {
            out.push_str(arg);
            i += pchars.len();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haxe_store() -> ModelStore {
        let mut store = ModelStore::new();
        for name in ["Int", "Float", "Bool", "String", "Dynamic", "EReg"] {
            let mut cls = ClassModel::void();
            cls.name = name.into();
            cls.flags = FlagType::CLASS;
            store.add_type(cls);
        }
        let mut iterator = ClassModel::void();
        iterator.name = "Iterator".into();
        iterator.flags = FlagType::CLASS;
        iterator.index_type = Some("T".into());
        iterator
            .members
            .push(MemberModel::new("hasNext", "Bool", FlagType::FUNCTION));
        iterator
            .members
            .push(MemberModel::new("next", "T", FlagType::FUNCTION));
        store.add_type(iterator);

        let mut array = ClassModel::void();
        array.name = "Array".into();
        array.flags = FlagType::CLASS;
        array.index_type = Some("T".into());
        array
            .members
            .push(MemberModel::new("length", "Int", FlagType::VARIABLE));
        array
            .members
            .push(MemberModel::new("iterator", "Iterator<T>", FlagType::FUNCTION));
        store.add_type(array);
        store
    }

    #[test]
    fn test_parameterize_substitutes_member_types() {
        let store = haxe_store();
        let ints = store.resolve_type("Array<Int>", None);
        assert_eq!(ints.name, "Array<Int>");
        assert_eq!(ints.index_type.as_deref(), Some("Int"));
        let iter = ints.search_member("iterator", FlagType::empty()).unwrap();
        assert_eq!(iter.type_str(), "Iterator<Int>");
    }

    #[test]
    fn test_null_wrapper_is_transparent() {
        let store = haxe_store();
        assert_eq!(store.resolve_type("Null<Int>", None).name, "Int");
    }

    #[test]
    fn test_resolve_type_miss_is_void() {
        let store = haxe_store();
        assert!(store.resolve_type("Missing", None).is_void());
        assert!(store.resolve_type("", None).is_void());
    }

    #[test]
    fn test_resolve_token_literals() {
        let store = haxe_store();
        assert_eq!(store.resolve_token("\"abc\"", None).name, "String");
        assert_eq!(store.resolve_token("42", None).name, "Int");
        assert_eq!(store.resolve_token("4.5", None).name, "Float");
        assert_eq!(store.resolve_token("true", None).name, "Bool");
        assert_eq!(store.resolve_token("~/a+/", None).name, "EReg");
        assert_eq!(store.resolve_token("[1, 2]", None).name, "Array<Dynamic>");
    }

    #[test]
    fn test_resolve_token_unterminated_bracket_literal() {
        let store = haxe_store();
        assert_eq!(store.resolve_token("[1, 2", None).name, "Array<Dynamic>");
        assert_eq!(store.resolve_token("[\"é", None).name, "Array<Dynamic>");
        assert_eq!(store.resolve_token("[", None).name, "Array<Dynamic>");
    }

    #[test]
    fn test_resolve_token_cast_forms() {
        let store = haxe_store();
        assert_eq!(store.resolve_token("cast(v, String)", None).name, "String");
        assert_eq!(store.resolve_token("cast v", None).name, "Dynamic");
        assert_eq!(store.resolve_token("(v is Int)", None).name, "Int");
        assert_eq!(store.resolve_token("(v : Float)", None).name, "Float");
        assert_eq!(store.resolve_token("new String(\"x\")", None).name, "String");
    }

    #[test]
    fn test_resolve_expression_walks_members() {
        let mut store = haxe_store();
        let mut cls = ClassModel::void();
        cls.name = "Foo".into();
        cls.flags = FlagType::CLASS;
        cls.members
            .push(MemberModel::new("items", "Array<Int>", FlagType::VARIABLE));
        store.add_type(cls.clone());
        store.set_current_class(cls.clone());

        let context = ExprContext::default();
        let result =
            store.resolve_expression("items.iterator()", &context, None, &cls, EvalFlags::empty());
        let ty = result.ty.expect("iterator() should resolve");
        assert_eq!(ty.name, "Iterator<Int>");
        assert_eq!(ty.index_type.as_deref(), Some("Int"));
    }

    #[test]
    fn test_resolve_expression_through_extends() {
        let mut store = haxe_store();
        let mut base = ClassModel::void();
        base.name = "Base".into();
        base.flags = FlagType::CLASS;
        base.members
            .push(MemberModel::new("shared", "String", FlagType::VARIABLE));
        store.add_type(base);
        let mut sub = ClassModel::void();
        sub.name = "Sub".into();
        sub.flags = FlagType::CLASS;
        sub.extends_type = Some("Base".into());
        store.add_type(sub.clone());

        let context = ExprContext::default();
        let result = store.resolve_expression("shared", &context, None, &sub, EvalFlags::empty());
        assert_eq!(result.ty.expect("inherited member").name, "String");
    }

    #[test]
    fn test_split_top_level_respects_generics() {
        assert_eq!(split_top_level("K,V", ','), vec!["K", "V"]);
        assert_eq!(
            split_top_level("Int, Map<String, Int>", ','),
            vec!["Int", " Map<String, Int>"]
        );
    }

    #[test]
    fn test_split_top_level_ignores_function_arrows() {
        assert_eq!(
            split_top_level("Int->Void,Bool", ','),
            vec!["Int->Void", "Bool"]
        );
        assert_eq!(
            split_top_level("K->Bool, Map<K, V->Int>", ','),
            vec!["K->Bool", " Map<K, V->Int>"]
        );
    }

    #[test]
    fn test_replace_type_param_is_token_bounded() {
        assert_eq!(replace_type_param("Iterator<T>", "T", "Int"), "Iterator<Int>");
        assert_eq!(replace_type_param("TValue", "T", "Int"), "TValue");
        assert_eq!(replace_type_param("T->T", "T", "Int"), "Int->Int");
    }
}
