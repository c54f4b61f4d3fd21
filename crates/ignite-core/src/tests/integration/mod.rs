#![cfg(test)]

pub mod common;
pub mod declarative_tests;
pub mod lifecycle_tests;
pub mod resolution_tests;
