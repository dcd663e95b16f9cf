pub mod anchor;
pub mod chaining;
pub mod overlap;
