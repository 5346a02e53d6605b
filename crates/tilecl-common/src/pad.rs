use crate::{Elem, Element, FloatKind, IntKind, UIntKind};

/// Value written to the physical cells of a tile that lie outside of its
/// valid region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PadValue {
    /// Padding cells are left untouched.
    #[default]
    Null,
    /// All bits cleared.
    Zero,
    /// Smallest representable value of the element.
    Min,
    /// Largest representable value of the element.
    Max,
}

impl PadValue {
    /// Bit pattern of the padding value for the given element, zero extended to 32 bits.
    ///
    /// Floating point types use infinities for [PadValue::Min] and [PadValue::Max].
    /// Unsigned integers have no sentinel below zero, so their minimum is the zero pattern.
    pub const fn bits(self, elem: Elem) -> Option<u32> {
        let (min, max) = match elem {
            Elem::Float(kind) => match kind {
                FloatKind::F16 => (0xFC00, 0x7C00),
                FloatKind::BF16 => (0xFF80, 0x7F80),
                FloatKind::F32 => (0xFF80_0000, 0x7F80_0000),
            },
            Elem::Int(kind) => match kind {
                IntKind::I8 => (0x80, 0x7F),
                IntKind::I16 => (0x8000, 0x7FFF),
                IntKind::I32 => (0x8000_0000, 0x7FFF_FFFF),
            },
            Elem::UInt(kind) => match kind {
                UIntKind::U8 => (0x0, 0xFF),
                UIntKind::U16 => (0x0, 0xFFFF),
                UIntKind::U32 => (0x0, 0xFFFF_FFFF),
            },
        };

        match self {
            PadValue::Null => None,
            PadValue::Zero => Some(0),
            PadValue::Min => Some(min),
            PadValue::Max => Some(max),
        }
    }

    /// The padding value for `E`, or `None` when padding cells are left untouched.
    pub fn value<E: Element>(self) -> Option<E> {
        self.bits(E::ELEM).map(E::from_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::{bf16, f16};

    #[test]
    fn zero_policy_clears_every_bit() {
        for elem in [
            <f16 as Element>::ELEM,
            <bf16 as Element>::ELEM,
            <f32 as Element>::ELEM,
            <i8 as Element>::ELEM,
            <u16 as Element>::ELEM,
            <i32 as Element>::ELEM,
        ] {
            assert_eq!(PadValue::Zero.bits(elem), Some(0), "{elem}");
        }
    }

    #[test]
    fn max_policy_patterns() {
        assert_eq!(PadValue::Max.value::<u8>(), Some(0xFF));
        assert_eq!(PadValue::Max.value::<f32>(), Some(f32::INFINITY));
        assert_eq!(PadValue::Max.value::<f16>(), Some(f16::INFINITY));
        assert_eq!(PadValue::Max.value::<bf16>(), Some(bf16::INFINITY));
        assert_eq!(PadValue::Max.value::<i16>(), Some(i16::MAX));
        assert_eq!(PadValue::Max.value::<u32>(), Some(u32::MAX));
    }

    #[test]
    fn min_policy_patterns() {
        assert_eq!(PadValue::Min.value::<f32>(), Some(f32::NEG_INFINITY));
        assert_eq!(PadValue::Min.value::<f16>(), Some(f16::NEG_INFINITY));
        assert_eq!(PadValue::Min.value::<i8>(), Some(i8::MIN));
        assert_eq!(PadValue::Min.value::<i32>(), Some(i32::MIN));
    }

    #[test]
    fn unsigned_min_collapses_to_zero() {
        assert_eq!(PadValue::Min.bits(<u8 as Element>::ELEM), PadValue::Zero.bits(<u8 as Element>::ELEM));
        assert_eq!(PadValue::Min.value::<u16>(), Some(0));
        assert_eq!(PadValue::Min.value::<u32>(), Some(0));
    }

    #[test]
    fn null_policy_has_no_value() {
        assert_eq!(PadValue::Null.value::<f32>(), None);
        assert_eq!(PadValue::default(), PadValue::Null);
    }
}
