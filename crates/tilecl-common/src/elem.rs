use core::fmt::{Debug, Display};

use bytemuck::Pod;
use half::{bf16, f16};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub enum FloatKind {
    F16,
    BF16,
    F32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub enum IntKind {
    I8,
    I16,
    I32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub enum UIntKind {
    U8,
    U16,
    U32,
}

/// Runtime description of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub enum Elem {
    Float(FloatKind),
    Int(IntKind),
    UInt(UIntKind),
}

impl Elem {
    /// Get the size in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Elem::Float(kind) => match kind {
                FloatKind::F16 => core::mem::size_of::<f16>(),
                FloatKind::BF16 => core::mem::size_of::<bf16>(),
                FloatKind::F32 => core::mem::size_of::<f32>(),
            },
            Elem::Int(kind) => match kind {
                IntKind::I8 => core::mem::size_of::<i8>(),
                IntKind::I16 => core::mem::size_of::<i16>(),
                IntKind::I32 => core::mem::size_of::<i32>(),
            },
            Elem::UInt(kind) => match kind {
                UIntKind::U8 => core::mem::size_of::<u8>(),
                UIntKind::U16 => core::mem::size_of::<u16>(),
                UIntKind::U32 => core::mem::size_of::<u32>(),
            },
        }
    }

    /// Whether the element is a signed or unsigned integer.
    pub const fn is_int(&self) -> bool {
        matches!(self, Elem::Int(_) | Elem::UInt(_))
    }

    /// Whether the element is a floating point number.
    pub const fn is_float(&self) -> bool {
        matches!(self, Elem::Float(_))
    }
}

impl Display for Elem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(kind) => match kind {
                FloatKind::F16 => f.write_str("f16"),
                FloatKind::BF16 => f.write_str("bf16"),
                FloatKind::F32 => f.write_str("f32"),
            },
            Self::Int(kind) => match kind {
                IntKind::I8 => f.write_str("i8"),
                IntKind::I16 => f.write_str("i16"),
                IntKind::I32 => f.write_str("i32"),
            },
            Self::UInt(kind) => match kind {
                UIntKind::U8 => f.write_str("u8"),
                UIntKind::U16 => f.write_str("u16"),
                UIntKind::U32 => f.write_str("u32"),
            },
        }
    }
}

/// An element that can be stored in global memory and in a tile.
///
/// The set of implementors is closed: it matches the data types the
/// accelerator instructions understand.
pub trait Element: Pod + Debug + PartialEq + PartialOrd + Send + Sync + 'static {
    /// Runtime description of the element.
    const ELEM: Elem;
    /// Size of the element in bytes.
    const SIZE: usize = Self::ELEM.size();

    /// Reinterpret the low `SIZE` bytes of `bits` as an element.
    fn from_bits(bits: u32) -> Self {
        match Self::SIZE {
            1 => bytemuck::cast(bits as u8),
            2 => bytemuck::cast(bits as u16),
            _ => bytemuck::cast(bits),
        }
    }

    /// Raw bit pattern of the element, zero extended.
    fn to_bits(self) -> u32 {
        match Self::SIZE {
            1 => bytemuck::cast::<Self, u8>(self) as u32,
            2 => bytemuck::cast::<Self, u16>(self) as u32,
            _ => bytemuck::cast(self),
        }
    }

    /// Lossless for every element type except when narrowing `f64` itself.
    fn to_f64(self) -> f64;

    /// Convert from `f64`, rounding or truncating like an `as` cast.
    fn from_f64(value: f64) -> Self;
}

/// Elements the vector and cube engines can compute on.
///
/// Integer arithmetic wraps around like the hardware does, floating point
/// arithmetic follows IEEE-754 in the element's own precision.
pub trait Numeric: Element {
    /// Additive identity.
    fn zero() -> Self;
    /// Multiplicative identity.
    fn one() -> Self;
    /// Addition.
    fn add(self, rhs: Self) -> Self;
    /// Multiplication.
    fn mul(self, rhs: Self) -> Self;
    /// Maximum of two elements.
    fn max(self, rhs: Self) -> Self {
        if rhs > self {
            rhs
        } else {
            self
        }
    }
    /// Minimum of two elements.
    fn min(self, rhs: Self) -> Self {
        if rhs < self {
            rhs
        } else {
            self
        }
    }
}

macro_rules! impl_int {
    ($ty:ty, $elem:expr) => {
        impl Element for $ty {
            const ELEM: Elem = $elem;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }
        }

        impl Numeric for $ty {
            fn zero() -> Self {
                0
            }

            fn one() -> Self {
                1
            }

            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
        }
    };
}

impl_int!(i8, Elem::Int(IntKind::I8));
impl_int!(i16, Elem::Int(IntKind::I16));
impl_int!(i32, Elem::Int(IntKind::I32));
impl_int!(u8, Elem::UInt(UIntKind::U8));
impl_int!(u16, Elem::UInt(UIntKind::U16));
impl_int!(u32, Elem::UInt(UIntKind::U32));

impl Element for f32 {
    const ELEM: Elem = Elem::Float(FloatKind::F32);

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Numeric for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
}

macro_rules! impl_half {
    ($ty:ty, $elem:expr) => {
        impl Element for $ty {
            const ELEM: Elem = $elem;

            fn to_f64(self) -> f64 {
                <$ty>::to_f64(self)
            }

            fn from_f64(value: f64) -> Self {
                <$ty>::from_f64(value)
            }
        }

        impl Numeric for $ty {
            fn zero() -> Self {
                <$ty>::ZERO
            }

            fn one() -> Self {
                <$ty>::ONE
            }

            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }
        }
    };
}

impl_half!(f16, Elem::Float(FloatKind::F16));
impl_half!(bf16, Elem::Float(FloatKind::BF16));

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sizes_match_rust_types() {
        assert_eq!(<f16 as Element>::SIZE, 2);
        assert_eq!(<bf16 as Element>::SIZE, 2);
        assert_eq!(<f32 as Element>::SIZE, 4);
        assert_eq!(<i8 as Element>::SIZE, 1);
        assert_eq!(<u16 as Element>::SIZE, 2);
        assert_eq!(<i32 as Element>::SIZE, 4);
    }

    #[test]
    fn bits_roundtrip_through_low_bytes() {
        assert_eq!(<u8 as Element>::from_bits(0x1FF), 0xFF);
        assert_eq!(<i16 as Element>::from_bits(0x8000), i16::MIN);
        assert_eq!(<f32 as Element>::from_bits(0x3F80_0000), 1.0);
        assert_eq!(f16::ONE.to_bits(), 0x3C00);
        assert_eq!(Element::to_bits(-1i8), 0xFF);
    }

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(Numeric::add(i8::MAX, 1), i8::MIN);
        assert_eq!(Numeric::mul(200u8, 2), 144);
        assert_eq!(Numeric::max(-3i32, 7), 7);
        assert_eq!(Numeric::min(f16::from_f32(2.0), f16::from_f32(-1.0)), f16::from_f32(-1.0));
    }

    #[test]
    fn display_uses_short_names() {
        assert_eq!(Elem::Float(FloatKind::BF16).to_string(), "bf16");
        assert_eq!(<u32 as Element>::ELEM.to_string(), "u32");
        assert!(<u32 as Element>::ELEM.is_int());
        assert!(<f16 as Element>::ELEM.is_float());
    }
}
