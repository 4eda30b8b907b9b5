//! Entity ↔ model mappers

mod group;
mod invitation;
mod membership;
mod user;

pub use membership::membership_from_model;
