use std::sync::Arc;

use crate::{
    config::HardwareProperties, sync::SyncFabric, InstructionTrace, StagingArea,
};

/// The two engine types of the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreKind {
    /// The matrix-multiply engine.
    Cube,
    /// A SIMD vector sub-engine.
    Vector,
}

/// Identifies one engine of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoreId {
    /// The single cube engine.
    Cube,
    /// The vector sub-engine with the given index.
    Vector(u8),
}

impl CoreId {
    /// The engine type.
    pub fn kind(&self) -> CoreKind {
        match self {
            CoreId::Cube => CoreKind::Cube,
            CoreId::Vector(_) => CoreKind::Vector,
        }
    }
}

impl core::fmt::Display for CoreId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CoreId::Cube => f.write_str("cube"),
            CoreId::Vector(id) => write!(f, "vector{id}"),
        }
    }
}

/// Pipeline stages of an engine.
///
/// Operations on one stage execute in program order, different stages overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipe {
    /// Scalar unit.
    S,
    /// Vector compute.
    V,
    /// Matrix compute.
    M,
    /// Staging to operand memory moves inside the cube engine.
    Mte1,
    /// Global (or shared on-chip) memory to staging memory transfers.
    Mte2,
    /// Staging memory to global (or shared on-chip) memory transfers.
    Mte3,
    /// Accumulator write-out.
    Fix,
}

/// Hardware staging areas a tile can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SpaceKind {
    /// Vector unified buffer.
    Vector,
    /// Cube staging matrix memory.
    Matrix,
    /// Left operand memory.
    Left,
    /// Right operand memory.
    Right,
    /// Accumulator memory.
    Acc,
    /// Bias table.
    Bias,
}

impl SpaceKind {
    /// The engine type that owns the area.
    pub const fn owner(self) -> CoreKind {
        match self {
            SpaceKind::Vector => CoreKind::Vector,
            _ => CoreKind::Cube,
        }
    }
}

/// Behavior shared by the cube engine and the vector sub-engines.
pub trait Engine: Send {
    /// Type of the engine.
    const KIND: CoreKind;

    /// Identity of this engine inside its launch.
    fn core_id(&self) -> CoreId;

    /// Hardware constants of the launch.
    fn properties(&self) -> &HardwareProperties;

    /// The staging area implementing the given space.
    ///
    /// # Panics
    /// If the space belongs to the other engine type.
    fn area(&self, space: SpaceKind) -> &StagingArea;

    /// Mutable access to the staging area implementing the given space.
    ///
    /// # Panics
    /// If the space belongs to the other engine type.
    fn area_mut(&mut self, space: SpaceKind) -> &mut StagingArea;

    /// Instructions issued so far.
    fn trace(&self) -> &InstructionTrace;

    /// Mutable access to the instruction trace.
    fn trace_mut(&mut self) -> &mut InstructionTrace;

    /// The flag tables of the launch.
    fn fabric(&self) -> &Arc<SyncFabric>;
}

/// The matrix-multiply engine and its staging areas.
#[derive(Debug)]
pub struct CubeEngine {
    properties: HardwareProperties,
    mat: StagingArea,
    left: StagingArea,
    right: StagingArea,
    acc: StagingArea,
    bias: StagingArea,
    trace: InstructionTrace,
    fabric: Arc<SyncFabric>,
}

impl CubeEngine {
    /// Create the cube engine of a launch.
    pub fn new(properties: HardwareProperties, fabric: Arc<SyncFabric>, trace: InstructionTrace) -> Self {
        Self {
            mat: StagingArea::new(SpaceKind::Matrix, properties.mat_bytes),
            left: StagingArea::new(SpaceKind::Left, properties.left_bytes),
            right: StagingArea::new(SpaceKind::Right, properties.right_bytes),
            acc: StagingArea::new(SpaceKind::Acc, properties.acc_bytes),
            bias: StagingArea::new(SpaceKind::Bias, properties.bias_bytes),
            properties,
            trace,
            fabric,
        }
    }

    /// A cube engine outside of any launch, with its own flag tables.
    pub fn detached(properties: HardwareProperties) -> Self {
        let fabric = Arc::new(SyncFabric::new(&properties));
        Self::new(properties, fabric, InstructionTrace::default())
    }

    /// Two distinct staging areas, the first borrowed shared and the second mutably.
    ///
    /// Used by moves between cube staging areas.
    ///
    /// # Panics
    /// If both spaces are the same or one of them is not a cube space.
    pub fn area_pair(&mut self, src: SpaceKind, dst: SpaceKind) -> (&StagingArea, &mut StagingArea) {
        assert_ne!(src, dst, "A move needs two distinct staging areas");
        let Self {
            mat,
            left,
            right,
            acc,
            bias,
            ..
        } = self;

        let mut src_area = None;
        let mut dst_area = None;
        for area in [mat, left, right, acc, bias] {
            if area.space() == src {
                src_area = Some(&*area);
            } else if area.space() == dst {
                dst_area = Some(area);
            }
        }

        match (src_area, dst_area) {
            (Some(src), Some(dst)) => (src, dst),
            _ => panic!("{src:?} and {dst:?} are not both cube staging areas"),
        }
    }
}

impl Engine for CubeEngine {
    const KIND: CoreKind = CoreKind::Cube;

    fn core_id(&self) -> CoreId {
        CoreId::Cube
    }

    fn properties(&self) -> &HardwareProperties {
        &self.properties
    }

    fn area(&self, space: SpaceKind) -> &StagingArea {
        match space {
            SpaceKind::Matrix => &self.mat,
            SpaceKind::Left => &self.left,
            SpaceKind::Right => &self.right,
            SpaceKind::Acc => &self.acc,
            SpaceKind::Bias => &self.bias,
            SpaceKind::Vector => panic!("The vector buffer is not addressable from the cube engine"),
        }
    }

    fn area_mut(&mut self, space: SpaceKind) -> &mut StagingArea {
        match space {
            SpaceKind::Matrix => &mut self.mat,
            SpaceKind::Left => &mut self.left,
            SpaceKind::Right => &mut self.right,
            SpaceKind::Acc => &mut self.acc,
            SpaceKind::Bias => &mut self.bias,
            SpaceKind::Vector => panic!("The vector buffer is not addressable from the cube engine"),
        }
    }

    fn trace(&self) -> &InstructionTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut InstructionTrace {
        &mut self.trace
    }

    fn fabric(&self) -> &Arc<SyncFabric> {
        &self.fabric
    }
}

/// One vector sub-engine and its unified buffer.
#[derive(Debug)]
pub struct VectorEngine {
    id: u8,
    properties: HardwareProperties,
    vec: StagingArea,
    trace: InstructionTrace,
    fabric: Arc<SyncFabric>,
}

impl VectorEngine {
    /// Create the vector sub-engine `id` of a launch.
    pub fn new(
        id: u8,
        properties: HardwareProperties,
        fabric: Arc<SyncFabric>,
        trace: InstructionTrace,
    ) -> Self {
        Self {
            id,
            vec: StagingArea::new(SpaceKind::Vector, properties.vec_bytes),
            properties,
            trace,
            fabric,
        }
    }

    /// A vector sub-engine outside of any launch, with its own flag tables.
    pub fn detached(properties: HardwareProperties) -> Self {
        let fabric = Arc::new(SyncFabric::new(&properties));
        Self::new(0, properties, fabric, InstructionTrace::default())
    }

    /// Index of this sub-engine.
    pub fn index(&self) -> u8 {
        self.id
    }
}

impl Engine for VectorEngine {
    const KIND: CoreKind = CoreKind::Vector;

    fn core_id(&self) -> CoreId {
        CoreId::Vector(self.id)
    }

    fn properties(&self) -> &HardwareProperties {
        &self.properties
    }

    fn area(&self, space: SpaceKind) -> &StagingArea {
        match space {
            SpaceKind::Vector => &self.vec,
            other => panic!("{other:?} is not addressable from a vector engine"),
        }
    }

    fn area_mut(&mut self, space: SpaceKind) -> &mut StagingArea {
        match space {
            SpaceKind::Vector => &mut self.vec,
            other => panic!("{other:?} is not addressable from a vector engine"),
        }
    }

    fn trace(&self) -> &InstructionTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut InstructionTrace {
        &mut self.trace
    }

    fn fabric(&self) -> &Arc<SyncFabric> {
        &self.fabric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_pair_borrows_two_spaces() {
        let mut engine = CubeEngine::detached(HardwareProperties::default());
        engine.area_mut(SpaceKind::Matrix).write(0, 3.0f32);

        let (src, dst) = engine.area_pair(SpaceKind::Matrix, SpaceKind::Left);
        let value: f32 = src.read(0);
        dst.write(4, value);

        assert_eq!(engine.area(SpaceKind::Left).read::<f32>(4), 3.0);
    }

    #[test]
    #[should_panic(expected = "not addressable")]
    fn vector_engine_rejects_cube_spaces() {
        let engine = VectorEngine::detached(HardwareProperties::default());
        engine.area(SpaceKind::Acc);
    }

    #[test]
    fn space_owner() {
        assert_eq!(SpaceKind::Vector.owner(), CoreKind::Vector);
        assert_eq!(SpaceKind::Bias.owner(), CoreKind::Cube);
        assert_eq!(CoreId::Vector(1).to_string(), "vector1");
    }
}
