use std::time::Duration;

use shared::protocol::{Item, ItemPage};

pub mod config;
mod controller;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod messages;
pub mod store;

pub use controller::{CommandOutcome, Draft, ItemController, ViewSnapshot};
pub use error::GatewayError;
pub use gateway::{HttpItemGateway, ItemGateway};
pub use messages::{Message, MessageCenter, MessageKind, DEFAULT_MESSAGE_TTL};

/// Synchronous yes/no question asked before destructive commands.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

pub struct AlwaysConfirm;

impl ConfirmationPrompt for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

pub struct NeverConfirm;

impl ConfirmationPrompt for NeverConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

/// Change notifications for whatever renders the controller's state.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    PageChanged(ItemPage),
    DraftChanged(Draft),
    LookupChanged(Option<Item>),
    MessageChanged(Option<Message>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub message_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            message_ttl: DEFAULT_MESSAGE_TTL,
        }
    }
}
