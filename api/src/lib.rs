#![deny(unreachable_patterns)]
#![deny(unknown_lints)]
#![deny(unused_variables)]
#![deny(unused_imports)]
// Unused results is more often than not an error
#![deny(unused_must_use)]
#[macro_use]
extern crate log;
#[macro_use]
extern crate logging;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod config;
pub mod controllers;
pub mod db;
pub mod errors;
pub mod extractors;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routing;
pub mod server;
pub mod utils;
pub mod workflow;
