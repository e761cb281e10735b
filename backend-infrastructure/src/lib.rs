pub mod config;
pub mod services;
pub mod sources;
pub mod utils;

pub use config::*;
pub use services::*;
pub use sources::*;
pub use utils::*;
