use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use expertise_core::content::CONTENT_VERSION;
use expertise_core::domain::expertise::{ExpertiseKey, ExpertiseUpdate};
use expertise_core::fields::parse_expertise_fields;
use expertise_core::token::{TokenRejected, TokenVerifier};
use expertise_db::repositories::ExpertiseRepository;

use crate::messages::{self, SlackMessage, TextStyle};

/// Form fields Slack posts for a slash command. Anything Slack omits
/// deserializes to an empty string.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlashCommandPayload {
    pub token: String,
    pub team_id: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
}

impl fmt::Debug for SlashCommandPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommandPayload")
            .field("token", &"[REDACTED]")
            .field("team_id", &self.team_id)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("command", &self.command)
            .field("text", &self.text)
            .finish()
    }
}

impl SlashCommandPayload {
    fn has_identity(&self) -> bool {
        !self.team_id.trim().is_empty() && !self.user_id.trim().is_empty()
    }

    fn key(&self) -> ExpertiseKey {
        ExpertiseKey::new(self.team_id.clone(), self.user_id.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlashCommand {
    SetExpertise,
    MyExpertise,
    TeamExperts,
    ExpertiseGuideline,
    CommandSummary,
}

impl SlashCommand {
    pub const ALL: [Self; 5] = [
        Self::SetExpertise,
        Self::MyExpertise,
        Self::TeamExperts,
        Self::ExpertiseGuideline,
        Self::CommandSummary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetExpertise => "set_expertise",
            Self::MyExpertise => "my_expertise",
            Self::TeamExperts => "team_experts",
            Self::ExpertiseGuideline => "expertise_guideline",
            Self::CommandSummary => "command_summary",
        }
    }

    /// Resolves a route segment (`set_expertise`) or a Slack command name
    /// (`/set_expertise`). Matching is exact.
    pub fn from_route(segment: &str) -> Option<Self> {
        let name = segment.strip_prefix('/').unwrap_or(segment);
        Self::ALL.into_iter().find(|command| command.as_str() == name)
    }
}

impl fmt::Display for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error(transparent)]
    InvalidToken(#[from] TokenRejected),
}

/// Verifies the caller and runs one of the five expertise commands.
///
/// Only a token mismatch is surfaced as an error. Invalid fields, a missing
/// record and store failures all become a regular [`SlackMessage`].
pub struct CommandRouter<R> {
    repository: R,
    verifier: TokenVerifier,
    style: TextStyle,
}

impl<R> CommandRouter<R>
where
    R: ExpertiseRepository,
{
    pub fn new(repository: R, verifier: TokenVerifier) -> Self {
        Self { repository, verifier, style: TextStyle::default() }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn route(
        &self,
        command: SlashCommand,
        payload: SlashCommandPayload,
        correlation_id: &str,
    ) -> Result<SlackMessage, CommandRouteError> {
        if let Err(rejected) = self.verifier.verify(&payload.token) {
            warn!(
                event_name = "slack.command.rejected",
                correlation_id = %correlation_id,
                command = command.as_str(),
                team_id = %payload.team_id,
                "slash command token rejected"
            );
            return Err(rejected.into());
        }

        info!(
            event_name = "slack.command.received",
            correlation_id = %correlation_id,
            command = command.as_str(),
            team_id = %payload.team_id,
            user_id = %payload.user_id,
            content_version = CONTENT_VERSION,
            "slash command received"
        );

        let message = match command {
            SlashCommand::SetExpertise => self.set_expertise(payload, correlation_id).await,
            SlashCommand::MyExpertise => self.my_expertise(payload, correlation_id).await,
            SlashCommand::TeamExperts => self.team_experts(correlation_id).await,
            SlashCommand::ExpertiseGuideline => messages::guideline_message(),
            SlashCommand::CommandSummary => messages::command_summary_message(),
        };

        Ok(message)
    }

    async fn set_expertise(&self, payload: SlashCommandPayload, correlation_id: &str) -> SlackMessage {
        if !payload.has_identity() {
            return messages::missing_identity_message(self.style);
        }

        let fields = match parse_expertise_fields(&payload.text) {
            Ok(fields) => fields,
            Err(error) => {
                info!(
                    event_name = "slack.command.invalid_fields",
                    correlation_id = %correlation_id,
                    error = %error,
                    "expertise fields rejected"
                );
                return messages::invalid_fields_message(self.style, &error);
            }
        };

        let update = ExpertiseUpdate { key: payload.key(), user_name: payload.user_name, fields };
        match self.repository.upsert(update).await {
            Ok(record) => {
                info!(
                    event_name = "slack.command.expertise_saved",
                    correlation_id = %correlation_id,
                    field_count = record.expertise.len(),
                    "expertise saved"
                );
                messages::expertise_saved_message(self.style, &record.expertise)
            }
            Err(error) => {
                warn!(
                    event_name = "slack.command.store_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "failed to save expertise"
                );
                messages::save_failed_message(self.style)
            }
        }
    }

    async fn my_expertise(&self, payload: SlashCommandPayload, correlation_id: &str) -> SlackMessage {
        if !payload.has_identity() {
            return messages::missing_identity_message(self.style);
        }

        match self.repository.find_by_key(&payload.key()).await {
            Ok(Some(record)) => messages::my_expertise_message(self.style, &record),
            Ok(None) => messages::expertise_not_set_message(self.style),
            Err(error) => {
                warn!(
                    event_name = "slack.command.store_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "failed to load expertise"
                );
                messages::lookup_failed_message(self.style)
            }
        }
    }

    async fn team_experts(&self, correlation_id: &str) -> SlackMessage {
        match self.repository.find_all().await {
            Ok(records) => messages::team_experts_message(self.style, &records),
            Err(error) => {
                warn!(
                    event_name = "slack.command.store_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "failed to list expertise"
                );
                messages::lookup_failed_message(self.style)
            }
        }
    }
}
