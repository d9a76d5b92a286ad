pub mod errors;
pub mod models;
pub mod payments;
pub mod slots;
pub mod time_format;
