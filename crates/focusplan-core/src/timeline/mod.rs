//! Time blocks and the day skeleton.
//!
//! This module provides:
//! - Block types for the day plan (meetings, work, breaks, free time)
//! - Skeleton generation from calendar events and work hours

mod blocks;
mod generator;

pub use blocks::{BlockType, Capacity, TimeBlock};
pub use generator::TimeBlockGenerator;
