pub mod actor;
pub mod feedback;
pub mod gesture;
pub mod machine;
