//! Structural function-type string parsing.
//!
//! Member types in the symbol model are strings, and a variable may hold a
//! function: `var f:Int->String`. This module rebuilds a member model with a
//! parameter list and return type from such a string, splitting on top-level
//! `->` while tracking `()`, `{}`, and `<>` nesting.

use hxc_model::{FileModel, FlagType, MemberModel, ResolveContext};

/// Parse a structural arrow-type string into a member with a parameter list
/// and a return type.
///
/// A single parameter of the void type collapses to an empty parameter list
/// (`Void->Int` takes no arguments). A leading `?` on a segment marks an
/// optional parameter and is moved onto the generated parameter name.
pub fn function_type_to_member(
    type_str: &str,
    ctx: &dyn ResolveContext,
    in_file: Option<&FileModel>,
) -> MemberModel {
    let void_key = ctx.features().void_key.clone();
    if type_str == "Function" {
        // haxe.Constraints.Function is a catch-all with no usable signature
        let param_type = ctx.resolve_type(type_str, in_file);
        if let Some(file) = &param_type.in_file {
            if file.package == "haxe" && file.module == "Constraints" {
                return MemberModel {
                    type_name: Some(void_key),
                    ..Default::default()
                };
            }
        }
    }
    let mut result = MemberModel::default();
    let chars: Vec<char> = type_str.chars().collect();
    let len = chars.len();
    let mut par_count = 0i32;
    let mut bra_count = 0i32;
    let mut gen_count = 0i32;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < len {
        let mut parameter_type: Option<String> = None;
        let c = chars[i];
        if c == '(' {
            par_count += 1;
        } else if c == ')' {
            par_count -= 1;
            if par_count == 0 && bra_count == 0 && gen_count == 0 {
                parameter_type = Some(collect(&chars, start, i + 1));
                start = i + 1;
            }
        } else if c == '{' {
            bra_count += 1;
        } else if c == '}' {
            bra_count -= 1;
            if par_count == 0 && bra_count == 0 && gen_count == 0 {
                parameter_type = Some(collect(&chars, start, i + 1));
                start = i + 1;
            }
        } else if c == '<' {
            gen_count += 1;
        } else if c == '>' && i > 0 && chars[i - 1] != '-' {
            gen_count -= 1;
            if par_count == 0 && bra_count == 0 && gen_count == 0 {
                parameter_type = Some(collect(&chars, start, i + 1));
                start = i + 1;
            }
        } else if par_count == 0
            && bra_count == 0
            && gen_count == 0
            && c == '-'
            && i + 1 < len
            && chars[i + 1] == '>'
        {
            if i > start {
                parameter_type = Some(collect(&chars, start, i));
            }
            start = i + 2;
            i += 1;
        }
        match parameter_type {
            None => {
                if i + 1 == len && i > start {
                    result.type_name = Some(collect(&chars, start, len));
                }
            }
            Some(mut parameter_type) => {
                let mut parameter_name = format!("parameter{}", result.parameters.len());
                if parameter_type.starts_with('?') {
                    parameter_name = format!("?{}", parameter_name);
                    parameter_type = parameter_type.trim_start_matches('?').to_string();
                }
                if i == len - 1 {
                    result.type_name = Some(parameter_type);
                } else {
                    result.parameters.push(MemberModel::new(
                        parameter_name,
                        parameter_type,
                        FlagType::PARAMETER_VAR,
                    ));
                }
            }
        }
        i += 1;
    }
    if result.parameters.len() == 1 && result.parameters[0].type_str() == void_key {
        result.parameters.clear();
    }
    result
}

/// View a variable member holding a function value as a callable member:
/// name preserved, signature parsed from its arrow-type string. Returns
/// `None` when the member is not a function-typed variable.
pub fn member_as_function(
    member: &MemberModel,
    ctx: &dyn ResolveContext,
    in_file: Option<&FileModel>,
) -> Option<MemberModel> {
    if !member.flags.contains(FlagType::VARIABLE) || !member.type_str().contains("->") {
        return None;
    }
    let file = member.in_file.as_deref().or(in_file);
    let mut converted = function_type_to_member(member.type_str(), ctx, file);
    converted.name = member.name.clone();
    converted.flags = member.flags | FlagType::FUNCTION;
    converted.line_from = member.line_from;
    converted.line_to = member.line_to;
    Some(converted)
}

/// Whether a type string is a structural function type. The void sentinel
/// type check is left to the caller.
pub fn is_function_type(type_str: &str) -> bool {
    type_str.contains("->")
}

fn collect(chars: &[char], start: usize, end: usize) -> String {
    chars[start.min(chars.len())..end.min(chars.len())]
        .iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::haxe_store;

    #[test]
    fn test_two_parameters_and_return() {
        let store = haxe_store();
        let member = function_type_to_member("Int->String->Bool", &store, None);
        assert_eq!(member.parameters.len(), 2);
        assert_eq!(member.parameters[0].name, "parameter0");
        assert_eq!(member.parameters[0].type_str(), "Int");
        assert_eq!(member.parameters[1].type_str(), "String");
        assert_eq!(member.type_str(), "Bool");
    }

    #[test]
    fn test_single_void_parameter_collapses() {
        let store = haxe_store();
        let member = function_type_to_member("Void->Int", &store, None);
        assert!(member.parameters.is_empty());
        assert_eq!(member.type_str(), "Int");
    }

    #[test]
    fn test_optional_parameter_marker() {
        let store = haxe_store();
        let member = function_type_to_member("?Int->String", &store, None);
        assert_eq!(member.parameters.len(), 1);
        assert_eq!(member.parameters[0].name, "?parameter0");
        assert_eq!(member.parameters[0].type_str(), "Int");
        assert_eq!(member.type_str(), "String");
    }

    #[test]
    fn test_nested_function_parameter() {
        let store = haxe_store();
        let member = function_type_to_member("(Int->Int)->Array<Int>->Int", &store, None);
        assert_eq!(member.parameters.len(), 2);
        assert_eq!(member.parameters[0].type_str(), "(Int->Int)");
        assert_eq!(member.parameters[1].type_str(), "Array<Int>");
        assert_eq!(member.type_str(), "Int");
    }

    #[test]
    fn test_structure_parameter() {
        let store = haxe_store();
        let member = function_type_to_member("{x:Int, y:Int}->Float", &store, None);
        assert_eq!(member.parameters.len(), 1);
        assert_eq!(member.parameters[0].type_str(), "{x:Int, y:Int}");
        assert_eq!(member.type_str(), "Float");
    }

    #[test]
    fn test_plain_type_is_return_only() {
        let store = haxe_store();
        let member = function_type_to_member("Array<Int>", &store, None);
        assert!(member.parameters.is_empty());
        assert_eq!(member.type_str(), "Array<Int>");
    }

    #[test]
    fn test_constraints_function_is_untypable() {
        use hxc_model::{ClassModel, FileModel};
        let mut store = haxe_store();
        let mut func = ClassModel::void();
        func.name = "Function".into();
        func.flags = FlagType::ABSTRACT;
        func.in_file = Some(Box::new(FileModel {
            file_name: "haxe/Constraints.hx".into(),
            package: "haxe".into(),
            module: "Constraints".into(),
            members: Vec::new(),
        }));
        store.add_type(func);
        let member = function_type_to_member("Function", &store, None);
        assert!(member.parameters.is_empty());
        assert_eq!(member.type_str(), "Void");
    }

    #[test]
    fn test_member_as_function_preserves_name() {
        let store = haxe_store();
        let mut var = MemberModel::new("callback", "Int->Void", FlagType::VARIABLE);
        var.line_from = 3;
        var.line_to = 3;
        let converted = member_as_function(&var, &store, None).expect("function-typed variable");
        assert_eq!(converted.name, "callback");
        assert!(converted.flags.contains(FlagType::FUNCTION));
        assert_eq!(converted.parameters.len(), 1);
        assert_eq!(converted.type_str(), "Void");

        let plain = MemberModel::new("count", "Int", FlagType::VARIABLE);
        assert!(member_as_function(&plain, &store, None).is_none());
    }
}
