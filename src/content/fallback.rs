//! Canned copy used when no provider produced a response.

use super::Template;

const TOPIC: &str = "{topic}";

fn variants(template: Template) -> &'static [&'static str] {
    match template {
        Template::Facebook => &[
            "Big news! {topic} is here and we can't wait to share it with you. Stop by, tell your friends, and be part of something new. Like and share if you're as excited as we are!",
            "You asked, we listened: {topic}. Come see what the buzz is about and let us know what you think in the comments!",
            "Mark your calendars! {topic} is happening and you're invited. Tag someone who needs to see this!",
        ],
        Template::Instagram => &[
            "✨ {topic} ✨\nCome say hi and see it for yourself.\n#new #local #comingsoon #supportsmallbusiness #community",
            "It's official: {topic} 🎉\nDouble tap if you're in!\n#announcement #new #shoplocal #excited #community",
        ],
        Template::Twitter => &[
            "{topic} is happening! Don't miss it. #News",
            "Say hello to {topic}. You're going to love it. #New",
        ],
        Template::LinkedIn => &[
            "We're proud to announce {topic}. This milestone reflects our commitment to the customers and partners who make our work possible. What would you like to see from us next?",
            "Today marks an exciting step for our team: {topic}. We'd love to hear how this could help your business. How do you see it fitting in?",
        ],
        Template::Email => &[
            "Subject: {topic}\n\nHi there,\n\nWe have exciting news to share: {topic}. We built this with you in mind and can't wait for you to experience it.\n\nClick below to learn more.\n\nThanks for being with us!",
            "Subject: Don't miss out: {topic}\n\nHello,\n\n{topic} is finally here. Be among the first to check it out.\n\nSee you soon!",
        ],
        Template::Blog => &[
            "# {topic}\n\n## What's new\nWe're thrilled to share {topic} with our readers.\n\n## Why it matters\nIt's a chance to try something fresh and connect with our community.\n\n## What's next\nStay tuned for more updates.",
            "# Introducing {topic}\n\n## The story\nEvery launch starts with an idea, and {topic} is ours.\n\n## The details\nHere's everything you need to know.\n\n## Join us\nWe'd love to see you there.",
        ],
        Template::Generic => &[
            "Discover {topic}. Quality you can count on, made for people like you. Get in touch today!",
            "{topic}: something new worth talking about. Come see the difference for yourself.",
        ],
    }
}

/// Stable checksum of the topic, independent of platform and process.
fn checksum(text: &str) -> u32 {
    text.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Synthesize local copy for `text` in the given template.
///
/// Pure: identical inputs always yield identical output, and the trimmed
/// topic appears verbatim in the body.
pub fn fallback_body(text: &str, template: Template) -> String {
    let topic = text.trim();
    let options = variants(template);
    let index = checksum(topic) as usize % options.len();
    options[index].replace(TOPIC, topic)
}
