//! HTTP endpoint handlers.

pub mod contact;
pub mod generate;
pub mod health;
pub mod leads;
