//! Wire schemas for the controller and recorder endpoints
//!
//! Field names are the contract between the two roles and with clients.

mod messages;

pub use messages::*;
