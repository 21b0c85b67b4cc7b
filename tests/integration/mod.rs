//! Integration tests for the chat panel.
//!
//! They drive the TEA update loop the way the logic thread does, with real
//! files and real tokio tasks for uploads.
//!
//! # Test Categories
//!
//! - `chat_flow`: typing, submitting, emoji picking and clearing
//! - `upload_ordering`: concurrent image ingestion and completion order

mod fixtures;

mod chat_flow;
mod upload_ordering;
