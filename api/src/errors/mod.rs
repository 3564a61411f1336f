pub use self::api_error::*;
pub use self::application_error::*;
pub use self::not_found_error::*;
pub use self::web_error::*;

mod api_error;
mod application_error;
mod not_found_error;
mod web_error;
