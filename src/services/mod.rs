// sporty-service/src/services/mod.rs
pub mod roles;
pub mod team_membership;
