//! Constructor, typedef-alias, and interface resolution.

use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use hxc_model::{ClassModel, ExprResult, FlagType, MemberModel};

use crate::{member_as_function, CompletionEngine};

impl CompletionEngine<'_> {
    /// Find the constructor a `new T(...)` expression invokes, walking up the
    /// extends chain when `T` declares none. The returned member is renamed to
    /// the requested type's simple name so calltips show the invoked name, and
    /// the class it was declared in accompanies it.
    ///
    /// Abstract classes terminate the walk: an abstract with no own
    /// constructor is not instantiable through an inherited one.
    pub fn resolve_constructor(&self, of_type: &ClassModel) -> Option<(MemberModel, ClassModel)> {
        let origin_name = of_type.simple_name().to_string();
        let mut current = of_type.clone();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        while !current.is_void() {
            if !visited.insert(current.name.clone()) {
                break;
            }
            let simple = current.simple_name().to_string();
            if let Some(member) = current.search_member(&simple, FlagType::CONSTRUCTOR) {
                let mut member = member.clone();
                if member.name != origin_name {
                    member.name = origin_name.clone();
                }
                trace!(ty = %current.name, "constructor found");
                return Some((member, current));
            }
            if current.flags.contains(FlagType::ABSTRACT) {
                return None;
            }
            current = self.ctx.resolve_extends(&current);
        }
        None
    }

    /// View a resolution result as a callable, for calltip display: a
    /// function-typed variable parses into a signature; a bare type resolves
    /// to its constructor. A result that already names a non-constructible
    /// member yields nothing.
    pub fn resolve_callable(&self, expr: &ExprResult) -> Option<MemberModel> {
        if let Some(member) = &expr.member {
            if let Some(converted) =
                member_as_function(member, self.ctx, Some(self.ctx.current_file()))
            {
                return Some(converted);
            }
            if expr.path != "super" {
                return None;
            }
        }
        let ty = expr.ty.as_ref()?;
        self.resolve_constructor(ty).map(|(ctor, _)| ctor)
    }

    /// Resolve one typedef-alias hop by re-reading the declaration line:
    /// `typedef Name = <rvalue>` binds `Name` to the resolved rvalue. Returns
    /// the void sentinel when the line does not carry a typedef of this name.
    pub fn infer_typedef_type(&self, of_type: &ClassModel) -> ClassModel {
        let line = self.buffer.line_text(of_type.line_from);
        let pattern = Regex::new(&format!(
            r"\s*typedef\s+{}\s*=([^;]+)",
            regex::escape(&of_type.simple_name())
        ));
        let Ok(pattern) = pattern else {
            return ClassModel::void();
        };
        match pattern.captures(&line) {
            Some(caps) => {
                let rvalue = caps.get(1).map(|m| m.as_str().trim_start()).unwrap_or("");
                self.ctx.resolve_type(rvalue, Some(self.ctx.current_file()))
            }
            None => ClassModel::void(),
        }
    }

    /// Follow a typedef-alias chain to the underlying type. Cycles and dead
    /// ends resolve to the void sentinel rather than looping.
    pub fn resolve_typedef_chain(&self, of_type: &ClassModel) -> ClassModel {
        let mut current = of_type.clone();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        while current.flags.contains(FlagType::TYPEDEF) && current.members.is_empty() {
            if !visited.insert(current.name.clone()) {
                debug!(name = %of_type.name, "typedef cycle");
                return ClassModel::void();
            }
            match &current.extends_type {
                Some(extends) if !extends.is_empty() => {
                    if visited.contains(extends.as_str()) {
                        return ClassModel::void();
                    }
                    current = self.ctx.resolve_extends(&current);
                }
                _ => current = self.infer_typedef_type(&current),
            }
        }
        current
    }

    /// All project types that are interfaces, including typedef aliases whose
    /// chain ends at an interface. The alias itself is returned, not its
    /// target, so an `implements` completion offers the name in scope.
    pub fn implements_list(&self) -> Vec<ClassModel> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out = Vec::new();
        for ty in self.ctx.all_project_types() {
            if !seen.insert(ty.name.clone()) {
                continue;
            }
            if ty.flags.contains(FlagType::INTERFACE) {
                out.push(ty);
                continue;
            }
            if ty.flags.contains(FlagType::TYPEDEF)
                && self
                    .resolve_typedef_chain(&ty)
                    .flags
                    .contains(FlagType::INTERFACE)
            {
                out.push(ty);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
