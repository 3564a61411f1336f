#[macro_use]
extern crate diesel;
extern crate backtrace;
extern crate chrono;
extern crate log;
#[macro_use]
extern crate logging;
extern crate rand;
extern crate regex;
extern crate uuid;
#[macro_use]
extern crate serde_derive;
extern crate serde;
#[macro_use]
extern crate serde_json;
extern crate validator;

pub mod models;
pub mod schema;
pub mod utils;
pub mod validators;

pub mod prelude {
    pub use models::*;
    pub use utils::errors::*;
}
