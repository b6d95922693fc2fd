pub mod associate;
pub mod error;
pub mod indexed;
pub mod radius;
