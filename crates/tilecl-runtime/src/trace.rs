use hashbrown::HashMap;

/// Classes of hardware instructions an engine can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Instruction {
    /// Per-row reduction of up to one pass of elements.
    VReduce,
    /// Element-wise binary operation over up to one pass of elements per repeat.
    VBinary,
    /// Vector copy over up to one pass of elements per repeat.
    VCopy,
    /// Broadcast of a scalar into a tile region.
    VDup,
    /// Burst descriptor based copy between global and staging memory.
    BurstCopy,
    /// Copy of one contiguous row or column between global and staging memory.
    LineCopy,
    /// Fractal box copy between global and staging memory.
    BlockCopy,
    /// Element-wise layout conversion copy.
    ElementCopy,
    /// Staging to operand memory move inside the cube engine.
    Move,
    /// Matrix multiply-accumulate.
    Mmad,
}

/// Counts the instructions issued by one engine.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct InstructionTrace {
    counts: HashMap<Instruction, u64>,
    log_instructions: bool,
}

impl InstructionTrace {
    /// Create a trace, optionally logging every issued instruction.
    pub fn new(log_instructions: bool) -> Self {
        Self {
            counts: HashMap::new(),
            log_instructions,
        }
    }

    /// Record `count` instructions of the given class.
    pub fn issue(&mut self, instruction: Instruction, count: u64) {
        if count == 0 {
            return;
        }
        if self.log_instructions {
            log::trace!("issue {instruction:?} x{count}");
        }
        *self.counts.entry(instruction).or_insert(0) += count;
    }

    /// Number of issued instructions of the given class.
    pub fn count(&self, instruction: Instruction) -> u64 {
        self.counts.get(&instruction).copied().unwrap_or(0)
    }

    /// Total number of issued instructions.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Forget every recorded instruction.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}
