//! MindTrack notifier library
//!
//! This library exposes the notification core of MindTrack for testing
//! and for the command-line front end.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod services;
pub mod storage;
