pub use self::database_transaction::*;
pub use self::request_logger::*;

mod database_transaction;
mod request_logger;
