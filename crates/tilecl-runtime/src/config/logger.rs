/// Log levels using the `log` crate.
///
/// This enum defines the verbosity used for the runtime's own messages.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Launches and fallbacks only.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Also logs transfer path selection and reduction plans.
    #[serde(rename = "debug")]
    Debug,

    /// Also logs every issued instruction and sync transition.
    #[serde(rename = "trace")]
    Trace,
}

/// Configuration for the runtime logs.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Verbosity of the runtime messages.
    #[serde(default)]
    pub level: LogCrateLevel,

    /// Whether each issued hardware instruction is logged.
    ///
    /// Only meaningful with [LogCrateLevel::Trace].
    #[serde(default)]
    pub trace_instructions: bool,
}

impl LoggerConfig {
    /// Whether instruction issue should be logged.
    pub fn log_instructions(&self) -> bool {
        self.trace_instructions && self.level == LogCrateLevel::Trace
    }

    /// Emit a message at the configured level.
    pub fn log<S: core::fmt::Display>(&self, msg: S) {
        match self.level {
            LogCrateLevel::Info => log::info!("{msg}"),
            LogCrateLevel::Debug => log::debug!("{msg}"),
            LogCrateLevel::Trace => log::trace!("{msg}"),
        }
    }
}
