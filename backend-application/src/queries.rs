pub mod alert_queries;
pub mod ops_queries;
