pub use self::digital_tickets::*;
pub use self::domain_events::*;
pub use self::enums::*;
pub use self::events::*;
pub use self::form_responses::*;
pub use self::forms::*;
pub use self::payments::*;
pub use self::receipts::*;
pub use self::registrations::*;
pub use self::ticket_types::*;
pub use self::users::*;

pub mod digital_tickets;
pub mod domain_events;
pub mod enums;
pub mod events;
pub mod form_responses;
pub mod forms;
pub mod payments;
pub mod receipts;
pub mod registrations;
pub mod ticket_types;
pub mod users;
