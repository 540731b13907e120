//! Mention markup normalization.
//!
//! Room messages address the bot with a structured mention tag:
//!
//! ```text
//! <p><spark-mention data-object-type="person" data-object-id="BOT_ID">Bot Name</spark-mention> status</p>
//! ```
//!
//! [`MentionNormalizer`] validates that the message opens with a mention of the
//! bot and hands back the command text that follows it, so command matchers
//! only ever see plain text.

use regex::Regex;

/// The bot's own platform identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: String,
    pub display_name: String,
}

impl BotIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Mention markup addressing this bot.
    pub fn mention_markup(&self) -> String {
        mention_markup(&self.id, &self.display_name)
    }
}

/// Mention markup for any person.
pub fn mention_markup(person_id: &str, display_name: &str) -> String {
    format!(
        r#"<spark-mention data-object-type="person" data-object-id="{}">{}</spark-mention>"#,
        person_id, display_name
    )
}

/// Strips a leading bot mention and optional paragraph wrapper.
#[derive(Debug, Clone)]
pub struct MentionNormalizer {
    pattern: Regex,
}

impl MentionNormalizer {
    pub fn new(bot: &BotIdentity) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r#"(?is)^(?:<p>|<div>)?<spark-mention\s+data-object-type="person"\s+data-object-id="{}"\s*>\s*{}\s*</spark-mention>(?P<rest>.*?)(?:</p>|</div>)?\s*$"#,
            regex::escape(&bot.id),
            regex::escape(&bot.display_name),
        ))?;

        Ok(Self { pattern })
    }

    /// Command text following the bot mention, or `None` when the markup does
    /// not open with a mention of this bot.
    pub fn command_text<'a>(&self, html: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(html.trim())
            .and_then(|caps| caps.name("rest"))
            .map(|rest| rest.as_str())
    }
}

/// Markup after the first mention of `person_id`, if it is mentioned.
pub fn after_mention<'a>(html: &'a str, person_id: &str) -> Option<&'a str> {
    let marker = format!(r#"data-object-id="{}""#, person_id);
    let start = html.find(&marker)?;
    let close = "</spark-mention>";
    let end = html[start..].find(close)? + start + close.len();
    Some(&html[end..])
}

/// Plain text of a markup fragment: tags removed, common entities decoded,
/// whitespace collapsed.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> BotIdentity {
        BotIdentity::new("bot-id", "Peggy")
    }

    fn normalizer() -> MentionNormalizer {
        MentionNormalizer::new(&bot()).unwrap()
    }

    #[test]
    fn test_command_text_with_paragraph() {
        let html = format!("<p>{} status</p>", bot().mention_markup());
        assert_eq!(normalizer().command_text(&html), Some(" status"));
    }

    #[test]
    fn test_command_text_without_paragraph() {
        let html = format!("{}winners", bot().mention_markup());
        assert_eq!(normalizer().command_text(&html), Some("winners"));
    }

    #[test]
    fn test_display_name_case_insensitive() {
        let html = format!("<p>{} ping</p>", mention_markup("bot-id", "PEGGY"));
        assert_eq!(normalizer().command_text(&html), Some(" ping"));
    }

    #[test]
    fn test_other_person_mention_rejected() {
        let html = format!("<p>{} winners</p>", mention_markup("someone-else", "Peggy"));
        assert!(normalizer().command_text(&html).is_none());
    }

    #[test]
    fn test_mention_not_leading_rejected() {
        let html = format!("<p>hey {} status</p>", bot().mention_markup());
        assert!(normalizer().command_text(&html).is_none());
    }

    #[test]
    fn test_special_characters_in_identity() {
        let bot = BotIdentity::new("a+b=", "Peg (bot)");
        let normalizer = MentionNormalizer::new(&bot).unwrap();
        let html = format!("<p>{} help</p>", bot.mention_markup());
        assert_eq!(normalizer.command_text(&html), Some(" help"));
    }

    #[test]
    fn test_after_mention() {
        let html = format!(
            "<p>{} peg {} for the demo</p>",
            bot().mention_markup(),
            mention_markup("bob", "Bob")
        );
        assert_eq!(after_mention(&html, "bob"), Some(" for the demo</p>"));
        assert!(after_mention(&html, "carol").is_none());
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup(" for <b>fixing</b> the&nbsp;build &amp; tests</p>"),
            "for fixing the build & tests"
        );
    }
}
