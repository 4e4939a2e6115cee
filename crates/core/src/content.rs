//! Static help text served by `/expertise_guideline` and `/command_summary`.
//!
//! Both blocks use Slack mrkdwn and are returned verbatim. Bump
//! [`CONTENT_VERSION`] whenever the wording changes; it is logged with every
//! slash command and reported by `/health`.

pub const CONTENT_VERSION: &str = "v1";

pub const FIELD_GUIDELINES: &str = "\
*Expertise Input Guidelines*

Enter your expertise as comma separated values. For example, \
`/set_expertise computer science, sports, ice-skating`.
Each field _must_ contain only letters of the alphabet, hyphens (-) and spaces ( ). \
If a field contains anything else (numbers included) or is left empty, the whole request \
is rejected and nothing is saved.

_Thank you for your cooperation!_";

pub const COMMAND_SUMMARY: &str = "\
*Team Expertise Commands*
- `/set_expertise` set your expertise so that it's known to the team.
- `/my_expertise` see the expertise you have set for yourself.
- `/team_experts` see who is an expert in what.
- `/expertise_guideline` see how to format the fields you are an expert in.
- `/command_summary` see this summary of commands.
_Is this confusing?_ Reach out to your workspace admins with questions and feedback.";

#[cfg(test)]
mod tests {
    use super::{COMMAND_SUMMARY, FIELD_GUIDELINES};

    #[test]
    fn command_summary_lists_every_command() {
        for command in [
            "/set_expertise",
            "/my_expertise",
            "/team_experts",
            "/expertise_guideline",
            "/command_summary",
        ] {
            assert!(COMMAND_SUMMARY.contains(command), "missing {command}");
        }
    }

    #[test]
    fn guidelines_show_a_valid_example() {
        let example = "computer science, sports, ice-skating";
        assert!(FIELD_GUIDELINES.contains(example));
        assert!(crate::fields::parse_expertise_fields(example).is_ok());
    }
}
