use strum::{Display, EnumIter, EnumString};

/// Represents a primitive (non-reference) type.
///
/// `Void` is included so that the "returns nothing" marker of a method can be
/// interned like any other type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
    /// The absence of a value. Only meaningful as a method return type.
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// Returns `true` for [`PrimitiveType::Void`].
    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, PrimitiveType::Void)
    }

    /// Returns `true` for the integral primitives (`byte`, `short`, `char`, `int`, `long`).
    #[inline]
    pub const fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    /// Returns `true` for `float` and `double`.
    #[inline]
    pub const fn is_floating(&self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }
}
