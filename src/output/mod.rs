//! Result reporting

pub mod json;
pub mod text;
