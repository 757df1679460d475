//! Integration tests for pulse-bot.
//!
//! These tests verify the interaction between components:
//! - Interval fallback over real HTTP
//! - A full cycle through the scheduler, publisher and response surface
//! - Advice generation against a chat completions endpoint

pub mod common;
