pub use self::display_registration::*;
pub use self::display_ticket_type::*;
pub use self::path_parameters::*;
pub use self::requests::*;

mod display_registration;
mod display_ticket_type;
mod path_parameters;
mod requests;
