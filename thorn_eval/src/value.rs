//! Constant values and the wide-integer newtype arithmetic goes through.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use thorn_ir::DefnId;
use thorn_types::PrimitiveKind;

/// A fixed-width integer constant. Unlike a plain `i128`, `ThornInt`
/// carries the primitive kind its value was produced at, so every
/// arithmetic method can wrap the result to that width the same way the
/// target machine would rather than overflow into the next width up.
///
/// Deliberately has no `Add`/`Sub`/`Mul`/`Div`/`Rem` trait impls: every
/// operation goes through a named `wrapping_*`/`checked_*` method so a
/// reader can see at the call site whether division-by-zero is possible.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ThornInt {
    kind: PrimitiveKind,
    raw: i128,
}

impl ThornInt {
    #[must_use]
    pub fn new(kind: PrimitiveKind, raw: i128) -> Self {
        ThornInt { kind, raw: wrap(kind, raw) }
    }

    #[must_use]
    pub fn kind(self) -> PrimitiveKind {
        self.kind
    }

    #[must_use]
    pub fn raw(self) -> i128 {
        self.raw
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.raw == 0
    }

    #[must_use]
    pub fn wrapping_add(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw.wrapping_add(rhs.raw))
    }

    #[must_use]
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw.wrapping_sub(rhs.raw))
    }

    #[must_use]
    pub fn wrapping_mul(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw.wrapping_mul(rhs.raw))
    }

    /// `None` only on division by zero; `tart`'s target machines trap on
    /// that the same way Rust's own integer division does, so unlike
    /// `wrapping_add`/`sub`/`mul` this one is fallible.
    #[must_use]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(ThornInt::new(self.kind, self.raw.wrapping_div(rhs.raw)))
    }

    #[must_use]
    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(ThornInt::new(self.kind, self.raw.wrapping_rem(rhs.raw)))
    }

    #[must_use]
    pub fn bit_and(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw & rhs.raw)
    }

    #[must_use]
    pub fn bit_or(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw | rhs.raw)
    }

    #[must_use]
    pub fn bit_xor(self, rhs: Self) -> Self {
        ThornInt::new(self.kind, self.raw ^ rhs.raw)
    }

    #[must_use]
    pub fn shl(self, bits: u32) -> Self {
        ThornInt::new(self.kind, self.raw.wrapping_shl(bits))
    }

    #[must_use]
    pub fn shr(self, bits: u32) -> Self {
        ThornInt::new(self.kind, self.raw.wrapping_shr(bits))
    }
}

/// Truncates `raw` to `kind`'s bit width, sign- or zero-extending back out
/// to `i128` as the kind's signedness dictates. `UnsizedInt` and
/// non-integer kinds pass through unchanged — callers only ever construct
/// a `ThornInt` once its literal has been finalized to a concrete width.
fn wrap(kind: PrimitiveKind, raw: i128) -> i128 {
    let Some(width) = kind.bit_width() else {
        return raw;
    };
    if width >= 128 {
        return raw;
    }
    let mask = (1i128 << width) - 1;
    let truncated = raw & mask;
    if kind.is_signed() {
        let sign_bit = 1i128 << (width - 1);
        if truncated & sign_bit != 0 {
            return truncated - (1i128 << width);
        }
    }
    truncated
}

/// An abstract record of field assignments produced by evaluating `new`.
/// Not a real heap object — the evaluator never allocates — just enough
/// structure to answer field loads/stores during constant folding.
///
/// Wrapped in `Rc<RefCell<_>>` by [`Value::ObjectRef`] rather than held by
/// value: classes are reference types (per
/// `CompositeKind::is_reference_kind`), so `self` and every other alias to
/// the same constructed object must observe the same field writes, shared
/// mutable identity instead of copy-on-bind semantics.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantObjectRef {
    pub class: DefnId,
    fields: FxHashMap<DefnId, Value>,
}

impl ConstantObjectRef {
    #[must_use]
    pub fn new(class: DefnId) -> Self {
        ConstantObjectRef { class, fields: FxHashMap::default() }
    }

    #[must_use]
    pub fn get_field(&self, field: DefnId) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn set_field(&mut self, field: DefnId, value: Value) {
        self.fields.insert(field, value);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Void,
    Null,
    Bool(bool),
    Int(ThornInt),
    Float(f64),
    Char(char),
    Str(String),
    ObjectRef(Rc<RefCell<ConstantObjectRef>>),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// A union's active member and its value; `tag` is the member's index
    /// within the union's canonicalized member list. Materializing a
    /// union this way (a tag alongside the payload, sized for whichever
    /// member is active) is the non-reference-only case `tart`'s own
    /// evaluator left unimplemented.
    Union { tag: u32, payload: Box<Value> },
}

impl Value {
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn new_object(class: DefnId) -> Self {
        Value::ObjectRef(Rc::new(RefCell::new(ConstantObjectRef::new(class))))
    }

    /// Identity comparison for `RefEq`: object references compare by
    /// pointer (two `new` calls are never the same object even with
    /// identical fields); everything else falls back to value equality,
    /// which is already the correct notion of identity for value types.
    #[must_use]
    pub fn ref_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::ObjectRef(a), Value::ObjectRef(b)) => Rc::ptr_eq(a, b),
            _ => a == b,
        }
    }
}
