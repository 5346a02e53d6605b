use tilecl_common::Element;

/// Hardware-imposed constants of the simulated accelerator.
///
/// The reduction scheduler and the transfer engine never hard-code these
/// values, so the same algorithms run unchanged for another hardware generation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareProperties {
    /// Bytes processed by one vector pass. The pass width `P` of an element
    /// type is `pass_bytes / size_of(E)`.
    #[serde(default = "default_pass_bytes")]
    pub pass_bytes: usize,

    /// Maximum repeat count of a vector instruction, which is also the
    /// number of rows one reduction instruction can address.
    #[serde(default = "default_max_repeat")]
    pub max_repeat: usize,

    /// Number of vector sub-engines paired with the cube engine.
    #[serde(default = "default_vector_cores")]
    pub vector_cores: usize,

    /// Capacity of the vector unified buffer.
    #[serde(default = "default_vec_bytes")]
    pub vec_bytes: usize,
    /// Capacity of the cube staging matrix memory.
    #[serde(default = "default_mat_bytes")]
    pub mat_bytes: usize,
    /// Capacity of the left operand memory.
    #[serde(default = "default_operand_bytes")]
    pub left_bytes: usize,
    /// Capacity of the right operand memory.
    #[serde(default = "default_operand_bytes")]
    pub right_bytes: usize,
    /// Capacity of the accumulator memory.
    #[serde(default = "default_acc_bytes")]
    pub acc_bytes: usize,
    /// Capacity of the bias table.
    #[serde(default = "default_bias_bytes")]
    pub bias_bytes: usize,

    /// Width of the burst count field of a burst descriptor.
    #[serde(default = "default_burst_count_bits")]
    pub burst_count_bits: u32,
    /// Width of the burst length field, in bytes.
    #[serde(default = "default_burst_len_bits")]
    pub burst_len_bits: u32,
    /// Width of the source and destination gap fields, in bytes.
    #[serde(default = "default_burst_gap_bits")]
    pub burst_gap_bits: u32,

    /// Number of flag identifiers per engine.
    #[serde(default = "default_flag_count")]
    pub flag_count: usize,
    /// Number of pending signals a single flag can hold before `record` blocks.
    #[serde(default = "default_flag_depth")]
    pub flag_depth: usize,
}

impl Default for HardwareProperties {
    fn default() -> Self {
        Self {
            pass_bytes: default_pass_bytes(),
            max_repeat: default_max_repeat(),
            vector_cores: default_vector_cores(),
            vec_bytes: default_vec_bytes(),
            mat_bytes: default_mat_bytes(),
            left_bytes: default_operand_bytes(),
            right_bytes: default_operand_bytes(),
            acc_bytes: default_acc_bytes(),
            bias_bytes: default_bias_bytes(),
            burst_count_bits: default_burst_count_bits(),
            burst_len_bits: default_burst_len_bits(),
            burst_gap_bits: default_burst_gap_bits(),
            flag_count: default_flag_count(),
            flag_depth: default_flag_depth(),
        }
    }
}

impl HardwareProperties {
    /// Elements of type `E` processed by one vector pass.
    pub fn pass_width<E: Element>(&self) -> usize {
        self.pass_bytes / E::SIZE
    }

    /// Largest burst count a single descriptor can encode.
    pub fn max_burst_count(&self) -> usize {
        field_max(self.burst_count_bits)
    }

    /// Largest burst length, in bytes, a single descriptor can encode.
    pub fn max_burst_len(&self) -> usize {
        field_max(self.burst_len_bits)
    }

    /// Largest source or destination gap, in bytes, a single descriptor can encode.
    pub fn max_burst_gap(&self) -> usize {
        field_max(self.burst_gap_bits)
    }

    /// Check that the properties describe a usable accelerator.
    pub fn validate(&self) -> Result<(), HardwarePropertiesError> {
        if self.pass_bytes < 32 || self.pass_bytes % 32 != 0 {
            return Err(HardwarePropertiesError::PassWidth {
                pass_bytes: self.pass_bytes,
            });
        }
        if self.max_repeat == 0 {
            return Err(HardwarePropertiesError::NoRepeat);
        }
        if self.vector_cores == 0 {
            return Err(HardwarePropertiesError::NoVectorCore);
        }
        if self.flag_count == 0 || self.flag_depth == 0 {
            return Err(HardwarePropertiesError::EmptyFlagTable {
                flag_count: self.flag_count,
                flag_depth: self.flag_depth,
            });
        }
        if self.burst_count_bits == 0 || self.burst_len_bits == 0 || self.burst_gap_bits == 0 {
            return Err(HardwarePropertiesError::EmptyBurstField);
        }
        Ok(())
    }
}

/// Reasons why [HardwareProperties] can't describe a usable accelerator.
#[derive(Clone, PartialEq, Eq)]
pub enum HardwarePropertiesError {
    /// The pass width is not a non-zero multiple of the 32-byte block.
    PassWidth {
        /// The configured pass width in bytes.
        pass_bytes: usize,
    },
    /// Vector instructions can't address a single row.
    NoRepeat,
    /// No vector sub-engine is paired with the cube engine.
    NoVectorCore,
    /// The flag tables can't hold a single signal.
    EmptyFlagTable {
        /// Number of flags per engine.
        flag_count: usize,
        /// Pending signals per flag.
        flag_depth: usize,
    },
    /// A burst descriptor field has no bit.
    EmptyBurstField,
}

impl core::fmt::Display for HardwarePropertiesError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::fmt::Debug for HardwarePropertiesError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PassWidth { pass_bytes } => write!(
                f,
                "Pass width of {pass_bytes} bytes should be a non-zero multiple of 32"
            ),
            Self::NoRepeat => f.write_str("Maximum repeat count should be at least 1"),
            Self::NoVectorCore => f.write_str("At least one vector sub-engine is required"),
            Self::EmptyFlagTable {
                flag_count,
                flag_depth,
            } => write!(
                f,
                "Flag table of {flag_count} flags with depth {flag_depth} can't synchronize anything"
            ),
            Self::EmptyBurstField => {
                f.write_str("Burst descriptor fields should be at least one bit wide")
            }
        }
    }
}

impl std::error::Error for HardwarePropertiesError {}

fn field_max(bits: u32) -> usize {
    if bits as usize >= usize::BITS as usize {
        usize::MAX
    } else {
        (1usize << bits) - 1
    }
}

fn default_pass_bytes() -> usize {
    256
}

fn default_max_repeat() -> usize {
    255
}

fn default_vector_cores() -> usize {
    2
}

fn default_vec_bytes() -> usize {
    192 * 1024
}

fn default_mat_bytes() -> usize {
    512 * 1024
}

fn default_operand_bytes() -> usize {
    64 * 1024
}

fn default_acc_bytes() -> usize {
    128 * 1024
}

fn default_bias_bytes() -> usize {
    1024
}

fn default_burst_count_bits() -> u32 {
    12
}

fn default_burst_len_bits() -> u32 {
    21
}

fn default_burst_gap_bits() -> u32 {
    16
}

fn default_flag_count() -> usize {
    16
}

fn default_flag_depth() -> usize {
    15
}
