pub mod availability;
pub mod booking;
pub mod session;
pub mod student;
pub mod tutor;
