//! Telegram delivery for tablewatch.
//!
//! One call per run: a multipart `sendPhoto` upload carrying the capture
//! artifact to the configured chat. The provider signals success with
//! `ok: true` in its JSON reply; anything else is a delivery failure that
//! the pipeline reports without aborting the reset step.

mod client;

pub use client::{DeliveryError, TelegramClient, TelegramConfig};
