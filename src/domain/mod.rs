pub mod log_entry;
pub mod point;
pub mod task;
pub mod validation;
