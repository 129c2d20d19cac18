//! Core data types shared by every CropShield state machine

pub mod context;
pub mod principal;
pub mod sequence;
