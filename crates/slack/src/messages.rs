use serde::Serialize;

use expertise_core::content::{COMMAND_SUMMARY, FIELD_GUIDELINES};
use expertise_core::domain::expertise::ExpertiseRecord;
use expertise_core::fields::FieldValidationError;

const WARNING_COLOR: &str = "warning";

/// How emphasis is rendered in reply text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    #[default]
    Mrkdwn,
    Plain,
}

impl TextStyle {
    pub fn from_mrkdwn_flag(enabled: bool) -> Self {
        if enabled {
            Self::Mrkdwn
        } else {
            Self::Plain
        }
    }

    pub fn bold(self, text: &str) -> String {
        self.wrap(text, '*')
    }

    pub fn italic(self, text: &str) -> String {
        self.wrap(text, '_')
    }

    pub fn code(self, text: &str) -> String {
        self.wrap(text, '`')
    }

    fn wrap(self, text: &str, marker: char) -> String {
        match self {
            Self::Mrkdwn => format!("{marker}{text}{marker}"),
            Self::Plain => text.to_owned(),
        }
    }

    fn is_mrkdwn(self) -> bool {
        matches!(self, Self::Mrkdwn)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
}

/// Reply body Slack renders for a slash command. Always sent with HTTP 200,
/// including for domain-level failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

pub struct MessageBuilder {
    text: String,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), attachments: Vec::new() }
    }

    pub fn attachment<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut AttachmentBuilder),
    {
        let mut builder = AttachmentBuilder::default();
        build(&mut builder);
        self.attachments.push(builder.build());
        self
    }

    pub fn build(self) -> SlackMessage {
        let attachments = if self.attachments.is_empty() { None } else { Some(self.attachments) };
        SlackMessage { text: self.text, attachments }
    }
}

#[derive(Default)]
pub struct AttachmentBuilder {
    text: String,
    color: Option<String>,
    mrkdwn: bool,
}

impl AttachmentBuilder {
    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    pub fn color(&mut self, color: impl Into<String>) -> &mut Self {
        self.color = Some(color.into());
        self
    }

    pub fn mrkdwn(&mut self, enabled: bool) -> &mut Self {
        self.mrkdwn = enabled;
        self
    }

    fn build(self) -> Attachment {
        let mrkdwn_in = if self.mrkdwn { vec!["text".to_owned()] } else { Vec::new() };
        Attachment { text: self.text, color: self.color, mrkdwn_in }
    }
}

fn bullet_list(fields: &[String]) -> String {
    fields.iter().map(|field| format!("• {field}")).collect::<Vec<_>>().join("\n")
}

pub fn expertise_saved_message(style: TextStyle, fields: &[String]) -> SlackMessage {
    MessageBuilder::new(format!(
        "{}\n{}",
        style.bold("Your expertise has been saved:"),
        bullet_list(fields)
    ))
    .build()
}

pub fn my_expertise_message(style: TextStyle, record: &ExpertiseRecord) -> SlackMessage {
    MessageBuilder::new(format!(
        "{}\n{}",
        style.bold("Your areas of expertise:"),
        bullet_list(&record.expertise)
    ))
    .build()
}

pub fn expertise_not_set_message(style: TextStyle) -> SlackMessage {
    MessageBuilder::new(format!(
        "You have not set your expertise yet. Use {} to let the team know what you are good at, or {} to see how.",
        style.code("/set_expertise"),
        style.code("/expertise_guideline")
    ))
    .build()
}

/// One `*name-or-id* - expertise-list` line per record, in store order.
pub fn team_experts_message(style: TextStyle, records: &[ExpertiseRecord]) -> SlackMessage {
    if records.is_empty() {
        return MessageBuilder::new(format!(
            "No one on the team has set their expertise yet. Be the first with {}.",
            style.code("/set_expertise")
        ))
        .build();
    }

    let lines = records
        .iter()
        .map(|record| format!("{} - {}", style.bold(record.display_name()), record.expertise_list()))
        .collect::<Vec<_>>()
        .join("\n");

    MessageBuilder::new(lines).build()
}

pub fn invalid_fields_message(style: TextStyle, error: &FieldValidationError) -> SlackMessage {
    MessageBuilder::new(format!(
        "{} {error}. Please follow the guidelines below and try again.",
        style.italic("Your expertise was not saved:")
    ))
    .attachment(|attachment| {
        attachment.text(FIELD_GUIDELINES).color(WARNING_COLOR).mrkdwn(style.is_mrkdwn());
    })
    .build()
}

pub fn missing_identity_message(style: TextStyle) -> SlackMessage {
    MessageBuilder::new(format!(
        "{} the request did not say which workspace and user it came from.",
        style.italic("Sorry,")
    ))
    .build()
}

pub fn save_failed_message(style: TextStyle) -> SlackMessage {
    MessageBuilder::new(format!(
        "{} something went wrong while saving your expertise. Please try again later.",
        style.italic("Sorry,")
    ))
    .build()
}

pub fn lookup_failed_message(style: TextStyle) -> SlackMessage {
    MessageBuilder::new(format!(
        "{} something went wrong while looking up expertise. Please try again later.",
        style.italic("Sorry,")
    ))
    .build()
}

pub fn guideline_message() -> SlackMessage {
    MessageBuilder::new(FIELD_GUIDELINES).build()
}

pub fn command_summary_message() -> SlackMessage {
    MessageBuilder::new(COMMAND_SUMMARY).build()
}

#[cfg(test)]
mod tests {
    use expertise_core::content::FIELD_GUIDELINES;
    use expertise_core::domain::expertise::{ExpertiseRecord, TeamId, UserId};
    use expertise_core::fields::FieldValidationError;

    use super::{
        expertise_saved_message, invalid_fields_message, team_experts_message, MessageBuilder,
        TextStyle,
    };

    fn record(user_id: &str, user_name: &str, expertise: &[&str]) -> ExpertiseRecord {
        ExpertiseRecord {
            team_id: TeamId("T1".to_owned()),
            user_id: UserId(user_id.to_owned()),
            user_name: user_name.to_owned(),
            expertise: expertise.iter().map(|field| (*field).to_owned()).collect(),
        }
    }

    #[test]
    fn builder_omits_attachments_when_none_were_added() {
        let message = MessageBuilder::new("hello").build();
        assert_eq!(message.attachments, None);

        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(json, serde_json::json!({ "text": "hello" }));
    }

    #[test]
    fn builder_serializes_attachments_in_slack_shape() {
        let message = MessageBuilder::new("top")
            .attachment(|attachment| {
                attachment.text("details").color("warning").mrkdwn(true);
            })
            .build();

        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "text": "top",
                "attachments": [{ "text": "details", "color": "warning", "mrkdwn_in": ["text"] }]
            })
        );
    }

    #[test]
    fn team_experts_renders_one_line_per_record() {
        let records = vec![
            record("U1", "grace", &["compilers", " navy"]),
            record("U2", "", &["math"]),
        ];

        let message = team_experts_message(TextStyle::Mrkdwn, &records);
        let lines: Vec<&str> = message.text.lines().collect();

        assert_eq!(lines, vec!["*grace* - compilers, navy", "*U2* - math"]);
    }

    #[test]
    fn plain_style_drops_emphasis_markers() {
        let records = vec![record("U1", "grace", &["compilers"])];
        let message = team_experts_message(TextStyle::Plain, &records);
        assert_eq!(message.text, "grace - compilers");
    }

    #[test]
    fn saved_message_lists_every_field() {
        let fields = vec!["computer science".to_owned(), " sports".to_owned()];
        let message = expertise_saved_message(TextStyle::Mrkdwn, &fields);

        assert!(message.text.ends_with("• computer science\n•  sports"));
    }

    #[test]
    fn invalid_fields_message_embeds_guidelines() {
        let error = FieldValidationError::UnsupportedCharacter {
            field: "abc123".to_owned(),
            character: '1',
        };
        let message = invalid_fields_message(TextStyle::Mrkdwn, &error);

        assert!(message.text.contains("abc123"));
        let attachments = message.attachments.expect("guideline attachment");
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].text, FIELD_GUIDELINES);
        assert_eq!(attachments[0].mrkdwn_in, vec!["text".to_owned()]);
    }
}
