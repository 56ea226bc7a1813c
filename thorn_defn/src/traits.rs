//! The `Traits` bitset every defn carries, and `FunctionDefn`'s
//! additional flag word.

use bitflags::bitflags;

bitflags! {
    /// Flags common to every defn variant.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Traits: u16 {
        const READ_ONLY             = 1 << 0;
        const CONST                 = 1 << 1;
        const UNSAFE                = 1 << 2;
        const SINGULAR              = 1 << 3;
        const SYNTHETIC             = 1 << 4;
        const REFLECT               = 1 << 5;
        const TEMPLATE_MEMBER       = 1 << 6;
        const PARTIAL_INSTANTIATION = 1 << 7;
        const REQUEST_STACK_TRACE   = 1 << 8;
        const MERGEABLE             = 1 << 9;
    }
}

bitflags! {
    /// `FunctionDefn`'s additional flag word.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FunctionFlags: u16 {
        const ABSTRACT          = 1 << 0;
        const INTERFACE_METHOD  = 1 << 1;
        const UNDEFINED         = 1 << 2;
        const OVERRIDE          = 1 << 3;
        const EXTERN            = 1 << 4;
        const CTOR              = 1 << 5;
        const FINAL              = 1 << 6;
        const NESTED            = 1 << 7;
        const MAKES_ALLOCS      = 1 << 8;
        const NO_INLINE         = 1 << 9;
        const HAS_SAFE_POINTS   = 1 << 10;
        const EXPLICIT_FINAL    = 1 << 11;
        const INTRINSIC         = 1 << 12;
        const TRACE_METHOD      = 1 << 13;
        const READ_ONLY_SELF    = 1 << 14;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_default_to_empty() {
        assert!(Traits::default().is_empty());
    }

    #[test]
    fn function_flags_combine() {
        let flags = FunctionFlags::CTOR | FunctionFlags::READ_ONLY_SELF;
        assert!(flags.contains(FunctionFlags::CTOR));
        assert!(!flags.contains(FunctionFlags::ABSTRACT));
    }
}
