//! Terminal UI for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that feeds keys, completion results and
//!   speech events to the [`ChatController`](crate::core::app::ChatController).
//! - [`view`] and [`renderer`]: presentation state and frame output.
//! - [`markdown`] and [`wrap`]: turning message text into display rows.
//! - [`theme`], [`appearance`] and [`toast`]: styling and notifications.
//!
//! The controller owns the conversation; this layer only presents it and
//! captures input.

pub mod appearance;
pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod toast;
pub mod view;
pub mod wrap;
