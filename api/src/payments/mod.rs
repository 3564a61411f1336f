pub use self::payment_processor::*;
pub use self::payment_processor_error::*;

pub mod cashfree;
mod payment_processor;
mod payment_processor_error;
