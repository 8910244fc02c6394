//! Shared test fixtures: a symbol store pre-loaded with the core toolkit
//! types the inference paths lean on.

use hxc_model::{ClassModel, FlagType, MemberModel, ModelStore};

/// A store with the basic types: primitives, `Iterator<T>`, `Array<T>`, and
/// `Map<K,V>`.
pub fn haxe_store() -> ModelStore {
    let mut store = ModelStore::new();
    for name in ["Int", "Float", "Bool", "String", "Dynamic", "EReg", "Void"] {
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

    let mut map = ClassModel::void();
    map.name = "Map".into();
    map.flags = FlagType::CLASS;
    map.index_type = Some("K,V".into());
    map.members
        .push(MemberModel::new("iterator", "Iterator<V>", FlagType::FUNCTION));
    map.members
        .push(MemberModel::new("exists", "K->Bool", FlagType::FUNCTION));
    store.add_type(map);

    store
}

/// A class entity with the given name, flags, and members built from
/// `(name, type, flags)` triples.
pub fn class(name: &str, flags: FlagType, members: &[(&str, &str, FlagType)]) -> ClassModel {
    let mut cls = ClassModel::void();
    cls.name = name.into();
    cls.flags = flags;
    for &(member_name, member_type, member_flags) in members {
        cls.members
            .push(MemberModel::new(member_name, member_type, member_flags));
    }
    cls
}

/// A local variable model declared on `line`.
pub fn local_var(name: &str, type_name: &str, line: i32) -> MemberModel {
    let mut var = MemberModel::new(name, type_name, FlagType::LOCAL_VAR);
    var.line_from = line;
    var.line_to = line;
    var
}
