//! Utility modules

pub mod testing;
