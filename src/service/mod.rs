pub mod auth;
pub mod crypto;
pub mod event;
pub mod log;
pub mod participant;
pub mod reconcile;
pub mod user;
