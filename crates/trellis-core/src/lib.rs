//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types for Trellis diagrams:
//!
//! - **Graph**: nodes, the cluster tree and edges of one diagram ([`graph`] module)
//! - **Catalog**: built-in provider icons ([`catalog::Icon`])
//! - **Attributes**: ordered engine attributes ([`attributes`] module)
//! - **Colors**: CSS color parsing with hex output ([`color::Color`])

pub mod attributes;
pub mod catalog;
pub mod color;
pub mod graph;
