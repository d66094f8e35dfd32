//! Reference worlds.

pub mod stockpile;
pub mod woodcutter;
