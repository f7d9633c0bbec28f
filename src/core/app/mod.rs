//! Conversation state and the operations that change it.

pub mod controller;

pub use controller::{
    ChatController, CompletionResult, PendingCompletion, SendOutcome, SendStart,
};
