// src/tests/mod.rs
mod common;
mod team_tests;
