// Pure domain services: no locking, no I/O

pub mod alert_table;
pub mod classifier;
pub mod history;

pub use alert_table::*;
pub use classifier::*;
pub use history::*;
