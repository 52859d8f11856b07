/// Skill Swap Server library
///
/// REST backend for a peer-to-peer skill exchange: accounts and sessions,
/// student profiles, swap requests, favorites, reports and an admin dashboard.
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod server;
pub mod services;
