use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::{
    config::{GlobalConfig, HardwareProperties, HardwarePropertiesError, LoggerConfig},
    sync::SyncFabric,
    CoreId, CubeEngine, Engine, InstructionTrace, VectorEngine,
};

/// Errors raised while launching a kernel.
pub enum LaunchError {
    /// The hardware properties can't describe a working accelerator.
    InvalidProperties(HardwarePropertiesError),
    /// An engine hit a dynamic precondition violation and aborted the kernel.
    KernelAborted {
        /// The engine that aborted first.
        core: CoreId,
        /// The abort message.
        message: String,
    },
}

impl core::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::fmt::Debug for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LaunchError::InvalidProperties(reason) => {
                write!(f, "Unable to launch because the hardware properties are invalid: {reason}")
            }
            LaunchError::KernelAborted { core, message } => {
                write!(f, "Kernel aborted on {core}: {message}")
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Instructions issued by every engine of a launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchReport {
    /// Trace of the cube engine, empty for vector-only launches.
    pub cube: InstructionTrace,
    /// Traces of the vector sub-engines, empty for cube-only launches.
    pub vector: Vec<InstructionTrace>,
}

/// Runs kernels on a freshly reset simulated accelerator.
///
/// Every engine runs on its own thread with zeroed staging areas and fresh
/// flag tables. An engine that panics closes the flag tables so that the
/// other engines abort instead of blocking forever.
#[derive(Debug, Clone)]
pub struct Launcher {
    properties: HardwareProperties,
    logger: LoggerConfig,
}

impl Default for Launcher {
    fn default() -> Self {
        let config = GlobalConfig::get();
        Self {
            properties: config.hardware.clone(),
            logger: config.logger.clone(),
        }
    }
}

impl Launcher {
    /// A launcher using the hardware properties of the global configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher using custom hardware properties.
    pub fn with_properties(properties: HardwareProperties) -> Result<Self, LaunchError> {
        properties
            .validate()
            .map_err(LaunchError::InvalidProperties)?;
        Ok(Self {
            properties,
            logger: GlobalConfig::get().logger.clone(),
        })
    }

    /// Hardware properties used by the launches.
    pub fn properties(&self) -> &HardwareProperties {
        &self.properties
    }

    /// Run `cube` on the cube engine and `vector` on every vector sub-engine concurrently.
    pub fn launch_mix<C, V>(&self, cube: C, vector: V) -> Result<LaunchReport, LaunchError>
    where
        C: FnOnce(&mut CubeEngine) + Send,
        V: Fn(&mut VectorEngine) + Sync,
    {
        self.launch(Some(cube), Some(vector))
    }

    /// Run `vector` on every vector sub-engine.
    pub fn launch_vector<V>(&self, vector: V) -> Result<LaunchReport, LaunchError>
    where
        V: Fn(&mut VectorEngine) + Sync,
    {
        self.launch(None::<fn(&mut CubeEngine)>, Some(vector))
    }

    /// Run `cube` on the cube engine alone.
    pub fn launch_cube<C>(&self, cube: C) -> Result<LaunchReport, LaunchError>
    where
        C: FnOnce(&mut CubeEngine) + Send,
    {
        self.launch(Some(cube), None::<fn(&mut VectorEngine)>)
    }

    fn launch<C, V>(&self, cube: Option<C>, vector: Option<V>) -> Result<LaunchReport, LaunchError>
    where
        C: FnOnce(&mut CubeEngine) + Send,
        V: Fn(&mut VectorEngine) + Sync,
    {
        let fabric = Arc::new(SyncFabric::new(&self.properties));
        let log_instructions = self.logger.log_instructions();
        self.logger.log(format!(
            "Launching kernel (cube: {}, vector cores: {})",
            cube.is_some(),
            if vector.is_some() { self.properties.vector_cores } else { 0 }
        ));

        let results = std::thread::scope(|scope| {
            let mut handles = Vec::new();

            if let Some(cube) = cube {
                let mut engine = CubeEngine::new(
                    self.properties.clone(),
                    fabric.clone(),
                    InstructionTrace::new(log_instructions),
                );
                let fabric = fabric.clone();
                handles.push(scope.spawn(move || -> EngineOutcome {
                    run_engine(CoreId::Cube, &fabric, || cube(&mut engine))?;
                    Ok((CoreId::Cube, engine.trace().clone()))
                }));
            }

            if let Some(vector) = vector.as_ref() {
                for id in 0..self.properties.vector_cores {
                    let core = CoreId::Vector(id as u8);
                    let mut engine = VectorEngine::new(
                        id as u8,
                        self.properties.clone(),
                        fabric.clone(),
                        InstructionTrace::new(log_instructions),
                    );
                    let fabric = fabric.clone();
                    handles.push(scope.spawn(move || -> EngineOutcome {
                        run_engine(core, &fabric, || vector(&mut engine))?;
                        Ok((core, engine.trace().clone()))
                    }));
                }
            }

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err((CoreId::Cube, "engine thread could not be joined".to_string())),
                })
                .collect::<Vec<EngineOutcome>>()
        });

        let mut report = LaunchReport::default();
        let mut aborts = Vec::new();
        for result in results {
            match result {
                Ok((CoreId::Cube, trace)) => report.cube = trace,
                Ok((CoreId::Vector(_), trace)) => report.vector.push(trace),
                Err(abort) => aborts.push(abort),
            }
        }

        if aborts.is_empty() {
            return Ok(report);
        }

        // Engines released by the poisoned fabric are collateral, report the origin.
        let origin = fabric.aborted();
        let index = aborts
            .iter()
            .position(|(core, _)| Some(*core) == origin)
            .unwrap_or(0);
        let (core, message) = aborts.swap_remove(index);
        log::warn!("Kernel aborted on {core}: {message}");
        Err(LaunchError::KernelAborted { core, message })
    }
}

type EngineOutcome = Result<(CoreId, InstructionTrace), (CoreId, String)>;

fn run_engine(core: CoreId, fabric: &SyncFabric, kernel: impl FnOnce()) -> Result<(), (CoreId, String)> {
    match catch_unwind(AssertUnwindSafe(kernel)) {
        Ok(()) => Ok(()),
        Err(payload) => {
            fabric.close(core);
            let message = if let Some(msg) = payload.downcast_ref::<&str>() {
                msg.to_string()
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown abort".to_string()
            };
            Err((core, message))
        }
    }
}
