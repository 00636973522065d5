//! Infrastructure layer: concrete implementations of the domain traits.

pub mod auth;
pub mod broadcast;
pub mod dto;
pub mod registry;
pub mod repository;
