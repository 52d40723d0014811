pub mod lifecycle;
pub mod manager;
