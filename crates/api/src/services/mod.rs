//! Request-independent logic shared by handlers: slot lookup, booking
//! confirmation and the tutor's local clock.

pub mod booking;
pub mod clock;
pub mod slots;
