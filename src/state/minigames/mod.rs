//! Self-contained mini-game simulators, one per puzzle room.

pub mod energy;
pub mod pump;
