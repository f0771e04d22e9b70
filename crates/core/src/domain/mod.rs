pub mod event;
pub mod persona;
pub mod report;
pub mod step;
