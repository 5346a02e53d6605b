use core::marker::PhantomData;
use std::sync::Arc;

use crate::{CoreId, CoreKind, CubeEngine, Engine, Pipe, VectorEngine};

use super::{FlagId, SyncFabric};

/// States of one synchronization edge.
///
/// `Idle → ProducerWriting → DataReady → ConsumerReading → BufferFree → Idle`.
/// Each endpoint tracks the part of the cycle it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeState {
    /// Nothing in flight.
    Idle,
    /// The producer owns the buffer and is filling it.
    ProducerWriting,
    /// The producer signaled the buffer content.
    DataReady,
    /// The consumer owns the buffer and is reading it.
    ConsumerReading,
    /// The consumer gave the buffer back.
    BufferFree,
}

/// How the handed-off tile travels between the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportPath {
    /// Through a global memory buffer.
    Global,
    /// Through the shared on-chip staging buffer.
    OnChip,
}

/// Direction of a synchronization edge, fixing which engine type produces.
pub trait Direction: Send + Sync + 'static {
    /// Engine type writing the handed-off buffer.
    const PRODUCER: CoreKind;
    /// Engine type reading the handed-off buffer.
    const CONSUMER: CoreKind;

    /// The producer engine.
    type ProducerEngine: Engine;
    /// The consumer engine.
    type ConsumerEngine: Engine;
}

/// Transport path of a synchronization edge.
pub trait Transport: Send + Sync + 'static {
    /// The path as a value.
    const PATH: TransportPath;
}

/// The cube engine produces, both vector sub-engines consume.
#[derive(Debug, Clone, Copy)]
pub struct CubeToVector;

/// Each vector sub-engine produces its part, the cube engine consumes all of them.
#[derive(Debug, Clone, Copy)]
pub struct VectorToCube;

/// Hand-off through global memory.
#[derive(Debug, Clone, Copy)]
pub struct ViaGlobal;

/// Hand-off through the shared on-chip staging buffer.
#[derive(Debug, Clone, Copy)]
pub struct ViaOnChip;

impl Direction for CubeToVector {
    const PRODUCER: CoreKind = CoreKind::Cube;
    const CONSUMER: CoreKind = CoreKind::Vector;
    type ProducerEngine = CubeEngine;
    type ConsumerEngine = VectorEngine;
}

impl Direction for VectorToCube {
    const PRODUCER: CoreKind = CoreKind::Vector;
    const CONSUMER: CoreKind = CoreKind::Cube;
    type ProducerEngine = VectorEngine;
    type ConsumerEngine = CubeEngine;
}

impl Transport for ViaGlobal {
    const PATH: TransportPath = TransportPath::Global;
}

impl Transport for ViaOnChip {
    const PATH: TransportPath = TransportPath::OnChip;
}

/// One logical producer → consumer hand-off crossing the engine boundary.
///
/// The edge uses two flags: `ready` travels from producer to consumer and
/// `free` travels back for back-pressure. `depth` buffers start out free, so
/// the producer's first `depth` allocations never block.
#[derive(new, Debug)]
pub struct SyncEdge<D: Direction, T: Transport> {
    ready: FlagId,
    free: FlagId,
    #[new(value = "1")]
    depth: usize,
    #[new(default)]
    _phantom: PhantomData<(D, T)>,
}

impl<D: Direction, T: Transport> Clone for SyncEdge<D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Direction, T: Transport> Copy for SyncEdge<D, T> {}

impl<D: Direction, T: Transport> SyncEdge<D, T> {
    /// Number of buffers cycling through the edge, e.g. 2 for double buffering.
    ///
    /// Binding an endpoint panics when the depth exceeds the flag depth of
    /// the engine, since a flag holds at most that many pending signals.
    pub fn with_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0, "A synchronization edge needs at least one buffer");
        self.depth = depth;
        self
    }

    /// Flag signaling data readiness.
    pub fn ready_flag(&self) -> FlagId {
        self.ready
    }

    /// Flag signaling a free buffer.
    pub fn free_flag(&self) -> FlagId {
        self.free
    }

    /// Stage on which the producer raises the ready flag: the stage that
    /// last wrote the handed-off buffer.
    pub fn record_pipe() -> Pipe {
        match D::PRODUCER {
            CoreKind::Cube => Pipe::Fix,
            CoreKind::Vector => Pipe::Mte3,
        }
    }

    /// Stage blocked by the consumer's wait.
    ///
    /// Global memory becomes visible through the transfer stage, the shared
    /// on-chip buffer through the compute stage.
    pub fn wait_pipe() -> Pipe {
        match (T::PATH, D::CONSUMER) {
            (TransportPath::Global, _) => Pipe::Mte2,
            (TransportPath::OnChip, CoreKind::Vector) => Pipe::V,
            (TransportPath::OnChip, CoreKind::Cube) => Pipe::M,
        }
    }

    /// Stage on which the consumer releases the buffer: the stage that last
    /// read it.
    pub fn free_pipe() -> Pipe {
        Self::wait_pipe()
    }

    /// Stage blocked by the producer's allocation.
    pub fn allocate_pipe() -> Pipe {
        Self::record_pipe()
    }

    /// The producing endpoint, bound to the producer engine.
    pub fn producer(&self, engine: &D::ProducerEngine) -> Producer<D, T> {
        self.check_depth(engine.properties().flag_depth);
        Producer {
            endpoint: Endpoint::new(engine.core_id(), engine.fabric().clone(), *self),
            credits: self.depth,
        }
    }

    /// The consuming endpoint, bound to the consumer engine.
    pub fn consumer(&self, engine: &D::ConsumerEngine) -> Consumer<D, T> {
        self.check_depth(engine.properties().flag_depth);
        Consumer {
            endpoint: Endpoint::new(engine.core_id(), engine.fabric().clone(), *self),
        }
    }

    fn check_depth(&self, flag_depth: usize) {
        assert!(
            self.depth <= flag_depth,
            "Edge depth {} exceeds the flag depth of {flag_depth}",
            self.depth
        );
    }
}

/// Fields shared by both endpoints.
#[derive(Debug)]
struct Endpoint<D: Direction, T: Transport> {
    core: CoreId,
    fabric: Arc<SyncFabric>,
    edge: SyncEdge<D, T>,
    state: EdgeState,
}

impl<D: Direction, T: Transport> Endpoint<D, T> {
    fn new(core: CoreId, fabric: Arc<SyncFabric>, edge: SyncEdge<D, T>) -> Self {
        Self {
            core,
            fabric,
            edge,
            state: EdgeState::Idle,
        }
    }

    /// The engines on the other side of the edge.
    ///
    /// The cube engine talks to every vector sub-engine, a vector sub-engine
    /// only to the cube engine.
    fn peers(&self) -> Vec<CoreId> {
        match self.core {
            CoreId::Cube => (0..self.fabric.vector_cores())
                .map(|id| CoreId::Vector(id as u8))
                .collect(),
            CoreId::Vector(_) => vec![CoreId::Cube],
        }
    }

    fn signal(&self, flag: FlagId, pipe: Pipe) {
        log::trace!("{} signals {flag} on {pipe:?}", self.core);
        for peer in self.peers() {
            self.fabric.raise(self.core, peer, flag);
        }
    }

    fn block(&self, flag: FlagId, pipe: Pipe) {
        log::trace!("{} blocks {pipe:?} on {flag}", self.core);
        for peer in self.peers() {
            self.fabric.wait(self.core, peer, flag);
        }
    }

    fn transition(&mut self, from: &[EdgeState], to: EdgeState) {
        debug_assert!(
            from.contains(&self.state),
            "Illegal sync transition on {}: {:?} -> {to:?}",
            self.core,
            self.state
        );
        log::trace!("{} edge {:?} -> {to:?}", self.core, self.state);
        self.state = to;
    }
}

/// Producer side of a [SyncEdge].
#[derive(Debug)]
pub struct Producer<D: Direction, T: Transport> {
    endpoint: Endpoint<D, T>,
    credits: usize,
}

impl<D: Direction, T: Transport> Producer<D, T> {
    /// Block until the consumer freed a buffer.
    ///
    /// The cube engine waits for every vector sub-engine to free its part.
    pub fn allocate(&mut self) {
        self.endpoint
            .transition(&[EdgeState::Idle, EdgeState::DataReady], EdgeState::ProducerWriting);
        if self.credits > 0 {
            self.credits -= 1;
            return;
        }
        let edge = self.endpoint.edge;
        self.endpoint
            .block(edge.free, SyncEdge::<D, T>::allocate_pipe());
    }

    /// Signal that the buffer holds the data.
    ///
    /// The cube engine raises the flag on every vector sub-engine, since each
    /// one waits on its own flag table.
    pub fn record(&mut self) {
        self.endpoint
            .transition(&[EdgeState::ProducerWriting], EdgeState::DataReady);
        let edge = self.endpoint.edge;
        self.endpoint
            .signal(edge.ready, SyncEdge::<D, T>::record_pipe());
    }

    /// Wait until every buffer handed off has been freed.
    ///
    /// Matches the consumer's trailing `free` calls so that no signal is left
    /// pending when the kernel ends.
    pub fn finish(&mut self) {
        self.endpoint
            .transition(&[EdgeState::Idle, EdgeState::DataReady], EdgeState::Idle);
        let edge = self.endpoint.edge;
        while self.credits < edge.depth {
            self.endpoint
                .block(edge.free, SyncEdge::<D, T>::allocate_pipe());
            self.credits += 1;
        }
    }

    /// The producer's view of the edge.
    pub fn state(&self) -> EdgeState {
        self.endpoint.state
    }
}

/// Consumer side of a [SyncEdge].
#[derive(Debug)]
pub struct Consumer<D: Direction, T: Transport> {
    endpoint: Endpoint<D, T>,
}

impl<D: Direction, T: Transport> Consumer<D, T> {
    /// Block until the producer recorded the data.
    ///
    /// The cube engine waits for every vector sub-engine, acting as a barrier
    /// over all of them.
    pub fn wait(&mut self) {
        self.endpoint.transition(
            &[EdgeState::Idle, EdgeState::BufferFree],
            EdgeState::ConsumerReading,
        );
        let edge = self.endpoint.edge;
        self.endpoint
            .block(edge.ready, SyncEdge::<D, T>::wait_pipe());
    }

    /// Consume the ready signal if it is already there, without blocking.
    ///
    /// Only succeeds when every producer of the edge recorded.
    pub fn try_wait(&mut self) -> bool {
        let edge = self.endpoint.edge;
        let peers = self.endpoint.peers();
        let ready = peers
            .iter()
            .all(|peer| self.endpoint.fabric.pending(self.endpoint.core, *peer, edge.ready) > 0);
        if !ready {
            return false;
        }
        for peer in peers {
            self.endpoint
                .fabric
                .try_wait(self.endpoint.core, peer, edge.ready);
        }
        self.endpoint.transition(
            &[EdgeState::Idle, EdgeState::BufferFree],
            EdgeState::ConsumerReading,
        );
        true
    }

    /// Signal that the buffer can be reused by the producer.
    pub fn free(&mut self) {
        self.endpoint
            .transition(&[EdgeState::ConsumerReading], EdgeState::BufferFree);
        let edge = self.endpoint.edge;
        self.endpoint
            .signal(edge.free, SyncEdge::<D, T>::free_pipe());
    }

    /// The consumer's view of the edge.
    pub fn state(&self) -> EdgeState {
        self.endpoint.state
    }
}
