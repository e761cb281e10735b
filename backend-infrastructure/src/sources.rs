pub mod channel_source;
pub mod jsonl_source;

pub use channel_source::*;
pub use jsonl_source::*;
