mod api;
mod avatar;
mod config;
mod logging;

pub use api::*;
pub use avatar::*;
pub use config::*;
pub use logging::*;
