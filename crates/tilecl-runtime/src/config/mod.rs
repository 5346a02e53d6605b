mod base;
mod hardware;
mod logger;

pub use base::*;
pub use hardware::*;
pub use logger::*;
