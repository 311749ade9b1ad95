//! # Storyforge CLI
//!
//! Terminal front end for Storyforge story files and the persistence API.
//!
//! - [`commands`]: create, extend, inspect and route story files offline
//! - [`play`]: interactive reader
//! - [`client`]: HTTP client for the persistence service

pub mod client;
pub mod commands;
pub mod play;

pub use client::StoryClient;
