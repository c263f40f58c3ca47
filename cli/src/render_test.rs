use study::conversation::Attachment;
use study::resources::{ResourceCategory, ResourceItem};

use super::*;

fn message(sender: Sender, text: &str) -> Message {
    Message {
        id: 1,
        text: text.to_owned(),
        sender,
        timestamp: 3_723_000.0,
        language: "hindi".to_owned(),
        attachment: None,
    }
}

#[test]
fn features_table_lists_every_tool_with_backend() {
    let table = features_table(&ServiceEndpoints::default());
    assert_eq!(table.lines().count(), FEATURES.len());
    assert!(table.contains("/resource_generator"));
    assert!(table.contains("http://localhost:8000"));
    let canvas = table.lines().find(|l| l.contains("/canvas")).unwrap();
    assert!(canvas.ends_with("no backend"));
}

#[test]
fn resources_renders_plan_sections_and_links() {
    let sections = vec![
        ResourceSection {
            category: ResourceCategory::Books,
            items: vec![ResourceItem { title: "SICP".into(), description: "by Abelson".into(), link: None }],
        },
        ResourceSection { category: ResourceCategory::Websites, items: vec![] },
    ];
    let out = resources(Some("  Start with basics  "), &sections);
    assert!(out.starts_with("Learning Plan\nStart with basics\n"));
    assert!(out.contains("== Books ==\n- SICP\n  by Abelson\n"));
    assert!(out.contains("== Websites ==\n  (none)\n"));
}

#[test]
fn resources_skips_blank_learning_plan() {
    let out = resources(Some("   "), &[]);
    assert!(out.is_empty());
}

#[test]
fn code_prints_blocks_then_explanation() {
    let response = CodeResponse {
        code_blocks: vec!["fn main() {}\n".into()],
        explanation: "Does nothing.".into(),
        messages: vec![],
    };
    assert_eq!(code(&response), "fn main() {}\n\nExplanation\nDoes nothing.\n");
}

#[test]
fn study_aid_includes_heading_when_echoed() {
    let response =
        StudyAidResponse { result: "E = mc^2".into(), aid_type: "formulas".into(), topic: "Relativity".into() };
    assert_eq!(study_aid(&response), "# Relativity (formulas)\n\nE = mc^2\n");
}

#[test]
fn chat_line_shows_time_sender_and_language() {
    assert_eq!(chat_line(&message(Sender::Bot, "namaste")), "[01:02:03] bot (Hindi): namaste");
}

#[test]
fn chat_line_appends_attachment() {
    let mut msg = message(Sender::User, "see file");
    msg.attachment = Some(Attachment { name: "notes.pdf".into() });
    assert!(chat_line(&msg).ends_with("see file [attached: notes.pdf]"));
    assert!(chat_line(&msg).contains("] you ("));
}
