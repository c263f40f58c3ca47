//! Plain-text rendering of backend results for the terminal.

use std::fmt::Write as _;

use study::ServiceEndpoints;
use study::conversation::{Message, Sender, language_name};
use study::features::FEATURES;
use study::resources::ResourceSection;
use study::wire::{CodeResponse, StudyAidResponse};

/// One line per study tool: icon, title, route and backend.
pub fn features_table(endpoints: &ServiceEndpoints) -> String {
    let mut out = String::new();
    for feature in &FEATURES {
        let backend = feature.service.map_or("no backend", |service| endpoints.base(service));
        let _ = writeln!(out, "{} {:<20} {:<22} {backend}", feature.icon.glyph(), feature.title, feature.path());
    }
    out
}

pub fn resources(learning_plan: Option<&str>, sections: &[ResourceSection]) -> String {
    let mut out = String::new();
    if let Some(plan) = learning_plan.map(str::trim).filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "Learning Plan\n{plan}\n");
    }
    for section in sections {
        let _ = writeln!(out, "== {} ==", section.title());
        if section.items.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for item in &section.items {
            let _ = writeln!(out, "- {}", item.title);
            if !item.description.is_empty() {
                let _ = writeln!(out, "  {}", item.description);
            }
            if let Some(link) = &item.link {
                let _ = writeln!(out, "  {link}");
            }
        }
        out.push('\n');
    }
    out
}

pub fn code(response: &CodeResponse) -> String {
    let mut out = String::new();
    for block in &response.code_blocks {
        let _ = writeln!(out, "{}\n", block.trim_end());
    }
    if !response.explanation.trim().is_empty() {
        let _ = writeln!(out, "Explanation\n{}", response.explanation.trim());
    }
    out
}

pub fn study_aid(response: &StudyAidResponse) -> String {
    let mut out = String::new();
    if !response.topic.is_empty() || !response.aid_type.is_empty() {
        let _ = writeln!(out, "# {} ({})\n", response.topic, response.aid_type);
    }
    let _ = writeln!(out, "{}", response.result.trim());
    out
}

/// `[HH:MM:SS] bot (English): text`, with the attachment name appended.
pub fn chat_line(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    let mut line =
        format!("[{}] {who} ({}): {}", utc_clock(message.timestamp), language_name(&message.language), message.text);
    if let Some(attachment) = &message.attachment {
        let _ = write!(line, " [attached: {}]", attachment.name);
    }
    line
}

fn utc_clock(ms: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let secs = (ms.max(0.0) / 1000.0) as u64 % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
