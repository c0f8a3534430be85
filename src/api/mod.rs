//! HTTP surface: the `/api` query endpoint, health, and the landing page.

pub mod routes;
pub mod server;
