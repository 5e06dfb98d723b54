//! Show description: the serde input model and a builder for tests and demos.

pub mod dsl;
pub mod props;
