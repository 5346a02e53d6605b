use tilecl_common::{Element, Numeric};
use tilecl_runtime::{Engine, Instruction, SpaceKind, VectorEngine};

use crate::ReduceInstruction;

/// Operand of a simulated vector instruction.
///
/// Repeat `i` of the instruction addresses the elements starting at byte
/// `offset + i * stride * size_of(E)` of the unified buffer.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VecOperand {
    /// Position of the first element of repeat 0, in bytes.
    pub offset: usize,
    /// Distance between two consecutive repeats, in elements.
    pub stride: usize,
}

impl VecOperand {
    /// The same operand moved `elements` further.
    pub fn at<E: Element>(self, elements: usize) -> Self {
        Self {
            offset: self.offset + elements * E::SIZE,
            stride: self.stride,
        }
    }

    /// The same operand with another repeat stride.
    pub fn with_stride(self, stride: usize) -> Self {
        Self {
            offset: self.offset,
            stride,
        }
    }

    fn element<E: Element>(&self, repeat: usize, index: usize) -> usize {
        self.offset + (repeat * self.stride + index) * E::SIZE
    }
}

fn check_limits<E: Element>(engine: &VectorEngine, mask: usize, repeat: usize) {
    let properties = engine.properties();
    let pass = properties.pass_width::<E>();
    assert!(
        mask > 0 && mask <= pass,
        "Vector mask of {mask} elements is outside of 1..={pass}"
    );
    assert!(
        repeat <= properties.max_repeat,
        "Repeat count {repeat} exceeds the limit of {}",
        properties.max_repeat
    );
}

/// Reduce the first `mask` elements of each repeat of `src` into one element
/// per repeat of `dst`.
pub fn vreduce<E: Numeric, I: ReduceInstruction>(
    engine: &mut VectorEngine,
    dst: VecOperand,
    src: VecOperand,
    mask: usize,
    repeat: usize,
) {
    check_limits::<E>(engine, mask, repeat);
    if repeat == 0 {
        return;
    }

    let area = engine.area_mut(SpaceKind::Vector);
    for rep in 0..repeat {
        let mut acc: E = area.read(src.element::<E>(rep, 0));
        for index in 1..mask {
            acc = I::combine(acc, area.read(src.element::<E>(rep, index)));
        }
        area.write(dst.element::<E>(rep, 0), acc);
    }
    engine.trace_mut().issue(Instruction::VReduce, 1);
}

/// Element-wise `dst = lhs ⊕ rhs` over `mask` elements per repeat.
///
/// Each repeat reads both operands before writing, so `dst` may alias `lhs`.
pub fn vbinary<E: Numeric, I: ReduceInstruction>(
    engine: &mut VectorEngine,
    dst: VecOperand,
    lhs: VecOperand,
    rhs: VecOperand,
    mask: usize,
    repeat: usize,
) {
    check_limits::<E>(engine, mask, repeat);
    if repeat == 0 {
        return;
    }

    let area = engine.area_mut(SpaceKind::Vector);
    let mut line = Vec::with_capacity(mask);
    for rep in 0..repeat {
        line.clear();
        for index in 0..mask {
            let a: E = area.read(lhs.element::<E>(rep, index));
            let b: E = area.read(rhs.element::<E>(rep, index));
            line.push(I::combine(a, b));
        }
        for (index, value) in line.iter().enumerate() {
            area.write(dst.element::<E>(rep, index), *value);
        }
    }
    engine.trace_mut().issue(Instruction::VBinary, 1);
}

/// Copy `mask` elements per repeat from `src` to `dst`.
pub fn vcopy<E: Element>(
    engine: &mut VectorEngine,
    dst: VecOperand,
    src: VecOperand,
    mask: usize,
    repeat: usize,
) {
    check_limits::<E>(engine, mask, repeat);
    if repeat == 0 {
        return;
    }

    let area = engine.area_mut(SpaceKind::Vector);
    for rep in 0..repeat {
        for index in 0..mask {
            let value: E = area.read(src.element::<E>(rep, index));
            area.write(dst.element::<E>(rep, index), value);
        }
    }
    engine.trace_mut().issue(Instruction::VCopy, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Max, Sum};
    use tilecl_runtime::config::HardwareProperties;

    fn engine_with(values: &[f32]) -> VectorEngine {
        let mut engine = VectorEngine::detached(HardwareProperties::default());
        let area = engine.area_mut(SpaceKind::Vector);
        for (index, value) in values.iter().enumerate() {
            area.write(index * 4, *value);
        }
        engine
    }

    #[test]
    fn vreduce_masks_each_repeat() {
        let values = (0..16).map(|v| v as f32).collect::<Vec<_>>();
        let mut engine = engine_with(&values);

        vreduce::<f32, Sum>(
            &mut engine,
            VecOperand::new(1024, 1),
            VecOperand::new(0, 8),
            3,
            2,
        );

        let area = engine.area(SpaceKind::Vector);
        assert_eq!(area.read::<f32>(1024), 0.0 + 1.0 + 2.0);
        assert_eq!(area.read::<f32>(1028), 8.0 + 9.0 + 10.0);
        assert_eq!(engine.trace().count(Instruction::VReduce), 1);
    }

    #[test]
    fn vbinary_allows_in_place_updates() {
        let values = [1.0, 5.0, 3.0, 2.0, 4.0, 0.0, 6.0, 1.0];
        let mut engine = engine_with(&values);
        let base = VecOperand::new(0, 8);

        vbinary::<f32, Max>(&mut engine, base, base, base.at::<f32>(4), 4, 1);

        let area = engine.area(SpaceKind::Vector);
        let result = (0..4).map(|i| area.read::<f32>(i * 4)).collect::<Vec<_>>();
        assert_eq!(result, vec![4.0, 5.0, 6.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "Vector mask of 65 elements")]
    fn mask_is_bounded_by_the_pass_width() {
        let mut engine = engine_with(&[]);
        vcopy::<f32>(&mut engine, VecOperand::new(0, 0), VecOperand::new(512, 0), 65, 1);
    }

    #[test]
    #[should_panic(expected = "Repeat count 256 exceeds")]
    fn repeat_is_bounded() {
        let mut engine = engine_with(&[]);
        vcopy::<f32>(&mut engine, VecOperand::new(0, 1), VecOperand::new(512, 1), 1, 256);
    }
}
