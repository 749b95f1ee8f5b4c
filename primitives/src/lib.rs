#![cfg_attr(not(feature = "std"), no_std)]

pub mod agent;
pub mod ecosystem;
pub mod job;

pub use agent::*;
pub use ecosystem::*;
pub use job::*;
