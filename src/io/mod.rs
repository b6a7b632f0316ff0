//! Persistence of media records

pub mod snapshot;
