pub mod errors;
pub mod rand;
