pub mod driver;
pub mod frame;
pub mod run;
pub mod session;
