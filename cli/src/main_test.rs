use study::conversation::{Phase, Sender};

use super::*;

#[test]
fn chat_input_recognizes_commands() {
    assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
    assert_eq!(ChatInput::parse("  /clear \n"), ChatInput::Clear);
    assert_eq!(ChatInput::parse("/quit please"), ChatInput::Text);
    assert_eq!(ChatInput::parse("what is osmosis?"), ChatInput::Text);
}

#[test]
fn blank_chat_line_is_the_only_rejection_between_completed_turns() {
    let mut conversation = Conversation::default();
    let mut draft = Draft::default();

    draft.text = "   ".to_owned();
    assert!(conversation.begin_send(&draft, 1.0).is_err());
    assert!(conversation.messages().is_empty());

    draft.text = "hello".to_owned();
    let turn = conversation.begin_send(&draft, 2.0).unwrap();
    conversation.complete(turn.ticket, Err(ApiError::Transport("down".to_owned())), 3.0);
    assert_eq!(conversation.phase(), Phase::Idle);
    assert_eq!(conversation.messages().last().map(|m| m.sender), Some(Sender::Bot));

    draft.text = "again".to_owned();
    assert!(conversation.begin_send(&draft, 4.0).is_ok());
}

#[test]
fn language_flag_accepts_known_codes_only() {
    assert_eq!(parse_language(" Hindi "), Ok("hindi".to_owned()));
    assert!(parse_language("klingon").is_err());
}
