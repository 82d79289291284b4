//! Webhook-driven LINE recipe bot: inbound message → chef-prompted chat
//! completion → (optional) recipe-photo generation → reply.

pub mod bot;
pub mod config;
pub mod line;
pub mod llm;
pub mod recipe;
pub mod server;
