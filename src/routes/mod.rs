// src/routes/mod.rs
pub mod auth_routes;
pub mod team_routes;
pub mod user_routes;
