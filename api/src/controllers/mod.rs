pub mod events;
pub mod payment_methods;
pub mod payments;
pub mod registrations;
pub mod status;
pub mod ticket_types;
pub mod tickets;
pub mod webhooks;
