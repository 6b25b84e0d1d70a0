pub mod cohort;
pub mod inventory;
pub mod ranking;
pub mod rfm;
pub mod snapshot;
pub mod trends;
