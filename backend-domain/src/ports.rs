// Port traits (interfaces)
// Define what the domain needs from the outside world

pub mod services;
pub mod source;

pub use services::*;
pub use source::*;
