pub use self::service_locator::*;

mod service_locator;
