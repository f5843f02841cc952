pub mod merge;
pub mod tags;
