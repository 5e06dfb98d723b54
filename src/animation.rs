pub mod curves;
pub mod interp;
