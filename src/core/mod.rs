//! Core functionality for workshop documents, the workshop library, and configuration

pub mod config;
pub mod document;
pub mod library;
pub mod markdown;
