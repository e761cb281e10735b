pub mod risk_service;
pub mod static_risk_service;

pub use risk_service::*;
pub use static_risk_service::*;
