//! Flag sets for symbol-model entities.

use bitflags::bitflags;

bitflags! {
    /// Classification bits for types and members.
    ///
    /// Bits are independent and combinable: a constructor is
    /// `FUNCTION | CONSTRUCTOR`, an inferred local binding is
    /// `VARIABLE | LOCAL_VAR | INFERRED`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlagType: u32 {
        /// A class declaration.
        const CLASS = 1 << 0;
        /// An interface declaration.
        const INTERFACE = 1 << 1;
        /// A typedef (type alias) declaration.
        const TYPEDEF = 1 << 2;
        /// An abstract type declaration.
        const ABSTRACT = 1 << 3;
        /// An enum declaration.
        const ENUM = 1 << 4;
        /// A variable (field or binding).
        const VARIABLE = 1 << 5;
        /// A function or method.
        const FUNCTION = 1 << 6;
        /// A constructor member.
        const CONSTRUCTOR = 1 << 7;
        /// A function parameter binding.
        const PARAMETER_VAR = 1 << 8;
        /// A function-local binding.
        const LOCAL_VAR = 1 << 9;
        /// A static member.
        const STATIC = 1 << 10;
        /// The type was heuristically derived and may be recomputed on a
        /// later inference pass.
        const INFERRED = 1 << 11;
    }
}

// Flags serialize as their raw bits; unknown bits survive a round trip so
// models written by a newer host still load.
impl serde::Serialize for FlagType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> serde::Deserialize<'de> for FlagType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = <u32 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(FlagType::from_bits_retain(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_combinable() {
        let ctor = FlagType::FUNCTION | FlagType::CONSTRUCTOR;
        assert!(ctor.contains(FlagType::CONSTRUCTOR));
        assert!(ctor.contains(FlagType::FUNCTION));
        assert!(!ctor.contains(FlagType::VARIABLE));
    }

    #[test]
    fn test_inferred_is_independent() {
        let mut flags = FlagType::VARIABLE | FlagType::LOCAL_VAR;
        flags |= FlagType::INFERRED;
        assert!(flags.contains(FlagType::LOCAL_VAR));
        flags.remove(FlagType::INFERRED);
        assert_eq!(flags, FlagType::VARIABLE | FlagType::LOCAL_VAR);
    }
}
