//! Core services: metadata extraction, directory scanning, classification,
//! callback bridging and upload orchestration

pub mod blocking;
pub mod classify;
pub mod extract;
pub mod listeners;
pub mod scan;
pub mod upload;
pub mod workflow;
