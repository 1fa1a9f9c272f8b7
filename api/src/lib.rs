#[macro_use]
extern crate bitflags;
extern crate serde;

pub mod config;
pub mod error;
pub mod packet;
pub mod utils;
