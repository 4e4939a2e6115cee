//! Slash-command surface for the team expertise directory.
//!
//! - `commands` resolves the five `/...` commands, verifies the Slack token
//!   and talks to the expertise store.
//! - `messages` shapes the `{text, attachments}` replies Slack renders.
//!
//! ```text
//! POST /slack/{command} → CommandRouter → ExpertiseRepository
//!                              ↓
//!                        SlackMessage ← messages::*
//! ```

pub mod commands;
pub mod messages;

pub use commands::{CommandRouteError, CommandRouter, SlashCommand, SlashCommandPayload};
pub use messages::{Attachment, MessageBuilder, SlackMessage, TextStyle};
