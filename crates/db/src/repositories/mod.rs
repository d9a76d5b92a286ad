pub mod availability;
pub mod session;
pub mod student;
pub mod tutor;
