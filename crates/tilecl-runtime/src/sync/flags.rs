use async_channel::{Receiver, Sender};

use crate::{config::HardwareProperties, CoreId};

/// Message carried by a poisoned fabric to every blocked engine.
pub(crate) const FABRIC_CLOSED: &str = "sync fabric closed after another engine aborted";

/// Identifier of a flag inside an engine's flag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagId(pub u8);

impl core::fmt::Display for FlagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "flag#{}", self.0)
    }
}

/// A counting flag: `set` adds one pending signal, `wait` consumes one.
#[derive(Debug)]
struct FlagSlot {
    sender: Sender<()>,
    receiver: Receiver<()>,
}

impl FlagSlot {
    fn new(depth: usize) -> Self {
        let (sender, receiver) = async_channel::bounded(depth);
        Self { sender, receiver }
    }

    fn set(&self) {
        if self.sender.send_blocking(()).is_err() {
            panic!("{FABRIC_CLOSED}");
        }
    }

    fn wait(&self) {
        if self.receiver.recv_blocking().is_err() {
            panic!("{FABRIC_CLOSED}");
        }
    }

    fn try_wait(&self) -> bool {
        self.receiver.try_recv().is_ok()
    }

    fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn close(&self) {
        self.sender.close();
    }
}

/// The per-engine flag tables of one launch.
///
/// The cube engine keeps one table per vector sub-engine, since each
/// sub-engine raises its flags independently; every vector sub-engine keeps a
/// single table written by the cube engine.
#[derive(Debug)]
pub struct SyncFabric {
    cube: Vec<Vec<FlagSlot>>,
    vector: Vec<Vec<FlagSlot>>,
    aborted: spin::Mutex<Option<CoreId>>,
}

impl SyncFabric {
    /// Create the flag tables for the given hardware.
    pub fn new(properties: &HardwareProperties) -> Self {
        let table = || {
            (0..properties.flag_count)
                .map(|_| FlagSlot::new(properties.flag_depth))
                .collect::<Vec<_>>()
        };

        Self {
            cube: (0..properties.vector_cores).map(|_| table()).collect(),
            vector: (0..properties.vector_cores).map(|_| table()).collect(),
            aborted: spin::Mutex::new(None),
        }
    }

    /// Number of vector sub-engines the fabric connects.
    pub fn vector_cores(&self) -> usize {
        self.vector.len()
    }

    /// Raise `flag` on the table of `to`, on behalf of `from`.
    pub fn raise(&self, from: CoreId, to: CoreId, flag: FlagId) {
        log::trace!("{from} raises {flag} on {to}");
        self.slot(from, to, flag).set();
    }

    /// Block `at` until `from` has raised `flag` on its table, then consume the signal.
    pub fn wait(&self, at: CoreId, from: CoreId, flag: FlagId) {
        log::trace!("{at} waits {flag} from {from}");
        self.slot(from, at, flag).wait();
    }

    /// Consume a pending signal of `flag` raised by `from` on `at` without blocking.
    pub fn try_wait(&self, at: CoreId, from: CoreId, flag: FlagId) -> bool {
        self.slot(from, at, flag).try_wait()
    }

    /// Number of signals raised by `from` on `at` not consumed yet.
    pub fn pending(&self, at: CoreId, from: CoreId, flag: FlagId) -> usize {
        self.slot(from, at, flag).pending()
    }

    /// Poison every flag after `core` aborted, so that blocked engines abort too
    /// instead of hanging the launch.
    pub fn close(&self, core: CoreId) {
        {
            let mut aborted = self.aborted.lock();
            if aborted.is_none() {
                *aborted = Some(core);
            }
        }

        for slot in self.cube.iter().chain(self.vector.iter()).flatten() {
            slot.close();
        }
    }

    /// The first engine that aborted, if any.
    pub fn aborted(&self) -> Option<CoreId> {
        *self.aborted.lock()
    }

    fn slot(&self, from: CoreId, to: CoreId, flag: FlagId) -> &FlagSlot {
        let table = match (from, to) {
            (CoreId::Vector(source), CoreId::Cube) => self.cube.get(source as usize),
            (CoreId::Cube, CoreId::Vector(target)) => self.vector.get(target as usize),
            _ => panic!("Flags only connect the cube engine with a vector sub-engine, got {from} -> {to}"),
        };
        let Some(table) = table else {
            panic!("No such engine for the edge {from} -> {to}");
        };
        match table.get(flag.0 as usize) {
            Some(slot) => slot,
            None => panic!("{flag} is outside of the {} entry flag table", table.len()),
        }
    }
}
