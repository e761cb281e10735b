// Domain value objects
pub mod identifiers;
pub mod risk_level;

pub use identifiers::*;
pub use risk_level::*;
