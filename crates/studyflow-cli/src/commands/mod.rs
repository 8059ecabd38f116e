pub mod availability;
pub mod config;
pub mod course;
pub mod deliverable;
pub mod grade;
pub mod plan;
pub mod progress;

mod common;
