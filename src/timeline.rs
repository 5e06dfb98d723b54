pub mod script;
pub mod segments;
pub mod triggers;
