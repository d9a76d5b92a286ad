pub mod auth;
pub mod availability;
pub mod booking;
pub mod payments;
pub mod sessions;
pub mod students;
pub mod tutor;
