//! Template tags and prompt formatting.

use super::StyleParameters;

/// Output format the copy is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Facebook,
    Instagram,
    Twitter,
    LinkedIn,
    Email,
    Blog,
    Generic,
}

impl Template {
    pub const ALL: [Template; 7] = [
        Template::Facebook,
        Template::Instagram,
        Template::Twitter,
        Template::LinkedIn,
        Template::Email,
        Template::Blog,
        Template::Generic,
    ];

    /// Parse a template tag. Unknown tags map to `Generic`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "facebook" | "fb" => Template::Facebook,
            "instagram" | "ig" | "insta" => Template::Instagram,
            "twitter" | "x" | "tweet" => Template::Twitter,
            "linkedin" => Template::LinkedIn,
            "email" | "newsletter" => Template::Email,
            "blog" | "article" => Template::Blog,
            _ => Template::Generic,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Template::Facebook => "facebook",
            Template::Instagram => "instagram",
            Template::Twitter => "twitter",
            Template::LinkedIn => "linkedin",
            Template::Email => "email",
            Template::Blog => "blog",
            Template::Generic => "generic",
        }
    }

    /// Instruction line that opens the provider prompt.
    fn instruction(self) -> &'static str {
        match self {
            Template::Facebook => {
                "Write an engaging Facebook post with a friendly hook, a short body and a clear call to action."
            }
            Template::Instagram => {
                "Write an Instagram caption with a punchy first line, a few emojis and 5 to 8 relevant hashtags."
            }
            Template::Twitter => {
                "Write a single tweet under 280 characters with one or two hashtags."
            }
            Template::LinkedIn => {
                "Write a professional LinkedIn post that highlights the business value and ends with a question."
            }
            Template::Email => {
                "Write a marketing email with a subject line, a greeting, two short paragraphs and a call to action."
            }
            Template::Blog => {
                "Write a blog post introduction with a headline and three short sections with subheadings."
            }
            Template::Generic => "Write compelling marketing copy.",
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Length guidance for a named length hint.
fn length_guidance(length: &str) -> String {
    match length.trim().to_lowercase().as_str() {
        "short" => "Keep it short (under 50 words).".to_string(),
        "medium" => "Aim for 80 to 150 words.".to_string(),
        "long" => "Go long (200 to 400 words).".to_string(),
        other => format!("Length: {}.", other),
    }
}

/// Build the final provider prompt from the user's text and style hints.
pub fn build_prompt(text: &str, style: &StyleParameters) -> String {
    let mut lines = vec![style.template().instruction().to_string()];

    if let Some(tone) = style.tone.as_deref().filter(|t| !t.trim().is_empty()) {
        lines.push(format!("Use a {} tone.", tone.trim()));
    }
    if let Some(length) = style.length.as_deref().filter(|l| !l.trim().is_empty()) {
        lines.push(length_guidance(length));
    }
    if let Some(level) = &style.creativity_level {
        lines.push(format!("Creativity level: {}.", level.label()));
    }

    lines.push(format!("Topic: {}", text.trim()));
    lines.join("\n")
}
