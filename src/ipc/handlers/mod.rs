pub mod auth;
pub mod catalog;
pub mod core;
pub mod events;
pub mod presence;
pub mod rooms;
pub mod routes;
pub mod sessions;
