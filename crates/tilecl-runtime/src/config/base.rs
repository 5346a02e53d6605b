use std::sync::Arc;

use super::{HardwareProperties, LogCrateLevel, LoggerConfig};

/// Static mutex holding the global configuration, initialized as `None`.
static TILECL_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// File names searched for when loading the configuration.
const CONFIG_FILE_NAMES: [&str; 2] = ["tilecl.toml", "TileCL.toml"];

/// Represents the global configuration for TileCL, combining the simulated
/// hardware properties and the logger settings.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Constants of the simulated accelerator.
    #[serde(default)]
    pub hardware: HardwareProperties,

    /// Configuration of the runtime logs.
    #[serde(default)]
    pub logger: LoggerConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `tilecl.toml` or `TileCL.toml` in the
    /// current directory or its parents, then applies the environment overrides. If no file is
    /// found, a default configuration is used.
    pub fn get() -> Arc<Self> {
        let mut state = TILECL_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    pub fn set(config: Self) {
        let mut state = TILECL_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(path, content)
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        if let Some(val) = env_usize("TILECL_PASS_BYTES") {
            self.hardware.pass_bytes = val;
        }
        if let Some(val) = env_usize("TILECL_MAX_REPEAT") {
            self.hardware.max_repeat = val;
        }
        if let Some(val) = env_usize("TILECL_VECTOR_CORES") {
            self.hardware.vector_cores = val;
        }

        if let Ok(val) = std::env::var("TILECL_LOG") {
            match val.as_str() {
                "info" => self.logger.level = LogCrateLevel::Info,
                "debug" => self.logger.level = LogCrateLevel::Debug,
                "trace" => self.logger.level = LogCrateLevel::Trace,
                "instructions" => {
                    self.logger.level = LogCrateLevel::Trace;
                    self.logger.trace_instructions = true;
                }
                other => log::warn!("Unknown TILECL_LOG value {other:?}, keeping the configured level"),
            }
        }

        self
    }

    /// Parse a configuration from its TOML representation.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn from_current_dir() -> Self {
        let mut dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(_) => return Self::default(),
        };

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                let Ok(content) = std::fs::read_to_string(&path) else {
                    continue;
                };

                match Self::from_toml(&content) {
                    Ok(config) => {
                        log::info!("Loaded TileCL configuration from {}", path.display());
                        return config;
                    }
                    Err(err) => {
                        log::warn!("Invalid configuration file {}: {err}", path.display());
                        return Self::default();
                    }
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    match val.parse() {
        Ok(val) => Some(val),
        Err(_) => {
            log::warn!("Ignoring {name}={val:?}, expected an unsigned integer");
            None
        }
    }
}
