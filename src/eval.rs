pub mod evaluator;
pub mod fingerprint;

pub(crate) mod backroom;
pub(crate) mod kamishibai;
pub(crate) mod news;
pub(crate) mod opening;
