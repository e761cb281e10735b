// Domain entities

pub mod alert;
pub mod assessment;
pub mod event;
pub mod pipeline_status;
pub mod runtime_config;

pub use alert::*;
pub use assessment::*;
pub use event::*;
pub use pipeline_status::*;
pub use runtime_config::*;
