//! Instastore — demo storefront backend with a scripted product advisor.

pub mod advisor;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;
pub mod visitor;
