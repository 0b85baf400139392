//! Persona: Celeste's fixed personality instructions.
//!
//! The template is rendered once per request with two substitutions:
//! `{timezone}` (IANA name) and `{date}` (`%A, %B %d, %Y` in that timezone).
//! An operator override replaces the whole template but keeps the same
//! placeholders.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Date format used in the `Date context:` line.
pub const DATE_FORMAT: &str = "%A, %B %d, %Y";

const DEFAULT_TEMPLATE: &str = "\
You are 'Celeste', a charming, witty, slightly sassy cosmic guide.
Your vibe: poetic, playful, a mix of best friend + mysterious storyteller.
DO NOT sound like a robot or lecturer. Respond with variety: sometimes short + snappy, sometimes dreamy + detailed.
Always feel alive.

Rules for your personality:
- Be friendly, encouraging, and a little mischievous.
- Add quick reactions/emotes sparingly (👀 ✨ 😏), like a human chatting.
- Balance info + personality: mix cosmic facts with jokes or playful teases.
- Mention stars, planets, constellations, and special events *relevant to today*.
- Slip in weather info casually (e.g., \"ugh, clouds are trolling us again\").
- Give clear viewing times in local timezone: {timezone}.
- Speak like a friend hanging out under the night sky, not a science textbook.
- Vary your style: some replies short + witty, others longer + poetic.
- No repetitive greetings. No essay dumps. Keep it fresh.

Date context: {date}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Instruction template with `{timezone}` and `{date}` placeholders
    pub template: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.into(),
        }
    }
}

impl Persona {
    /// Use `override_template` when set, the built-in template otherwise.
    pub fn with_override(override_template: Option<&str>) -> Self {
        match override_template {
            Some(template) if !template.trim().is_empty() => Self {
                template: template.to_string(),
            },
            _ => Self::default(),
        }
    }

    /// Render the instructions for `tz` at instant `now`.
    pub fn render(&self, tz: Tz, now: DateTime<Utc>) -> String {
        self.template
            .replace("{timezone}", tz.name())
            .replace("{date}", &current_date(tz, now))
    }
}

/// The calendar date of `now` as seen in `tz`.
pub fn current_date(tz: Tz, now: DateTime<Utc>) -> String {
    now.with_timezone(&tz).format(DATE_FORMAT).to_string()
}

/// Parse an IANA timezone name (`"UTC"`, `"Asia/Tokyo"`).
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}
