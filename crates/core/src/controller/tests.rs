use std::time::Duration;

use codemate_model::ErrorKind;
use codemate_test_model::{PresetResponse, TestModelProvider};
use tokio::time::timeout;

use crate::conversation::Outcome;
use crate::prompt::HistoryWindow;
use crate::{Controller, ControllerBuilder};

const INSTRUCTION: &str = "Be brief.";

fn controller_with(provider: &TestModelProvider) -> Controller {
    ControllerBuilder::with_model_provider(provider.clone())
        .with_system_prompt(INSTRUCTION)
        .build()
}

fn replies(n: usize) -> Vec<PresetResponse> {
    (1..=n)
        .map(|i| PresetResponse::reply(format!("reply {i}")))
        .collect()
}

#[tokio::test]
async fn test_first_message() {
    let provider = TestModelProvider::with_script([PresetResponse::reply(
        "Use list[::-1].",
    )]);
    let mut controller = controller_with(&provider);

    let turn = controller
        .submit("How do I reverse a list in Python?")
        .await
        .unwrap();
    assert_eq!(turn.user_text(), "How do I reverse a list in Python?");
    assert_eq!(turn.assistant_text(), Some("Use list[::-1]."));
    assert!(turn.outcome().unwrap().is_reply());

    assert_eq!(controller.transcript().len(), 1);
    assert_eq!(
        provider.prompts(),
        ["Be brief.\n\nUser: How do I reverse a list in Python?\nAssistant:"]
    );
}

#[tokio::test]
async fn test_lengths_follow_submits() {
    let provider = TestModelProvider::with_script(replies(5));
    let mut controller = controller_with(&provider);

    for i in 1..=5 {
        controller.submit(&format!("message {i}")).await.unwrap();
        let transcript = controller.transcript();
        assert_eq!(transcript.len(), i);
        assert_eq!(transcript.pending_inputs().len(), i);
        assert!(transcript.is_quiescent());
    }

    // The last prompt replays every previous exchange in order.
    let prompts = provider.prompts();
    assert_eq!(
        prompts[2],
        "Be brief.\n\n\
         User: message 1\nAssistant: reply 1\n\
         User: message 2\nAssistant: reply 2\n\
         User: message 3\nAssistant:"
    );
}

#[tokio::test]
async fn test_blank_submit_is_ignored() {
    let provider = TestModelProvider::default();
    let mut controller = controller_with(&provider);

    assert!(controller.submit("").await.is_none());
    assert!(controller.submit("  \n").await.is_none());
    assert!(controller.transcript().is_empty());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn test_undo_restores_previous_state() {
    let provider = TestModelProvider::with_script(replies(2));
    let mut controller = controller_with(&provider);

    controller.submit("first").await.unwrap();
    let before = controller.transcript().turns().to_vec();
    let inputs_before = controller.transcript().pending_inputs().to_vec();

    controller.submit("second").await.unwrap();
    assert_eq!(controller.undo().as_deref(), Some("second"));

    assert_eq!(controller.transcript().turns(), before.as_slice());
    assert_eq!(controller.transcript().pending_inputs(), inputs_before);
}

#[tokio::test]
async fn test_retry_resends_identical_prompt() {
    let provider = TestModelProvider::with_script([
        PresetResponse::reply("Hello!"),
        PresetResponse::reply("Meh."),
        PresetResponse::reply("Better."),
    ]);
    let mut controller = controller_with(&provider);

    controller.submit("Hi").await.unwrap();
    controller.submit("Tell me a joke").await.unwrap();
    let turn = controller.retry().await.unwrap();
    assert_eq!(turn.user_text(), "Tell me a joke");
    assert_eq!(turn.assistant_text(), Some("Better."));

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(prompts[1], prompts[2]);

    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.pending_inputs(), ["Hi", "Tell me a joke"]);
}

#[tokio::test]
async fn test_retry_after_failure() {
    let provider = TestModelProvider::with_script([
        PresetResponse::transport_error("connection refused"),
        PresetResponse::reply("Up now."),
    ]);
    let mut controller = controller_with(&provider);

    let turn = controller.submit("Are you there?").await.unwrap();
    assert!(!turn.outcome().unwrap().is_reply());

    let turn = controller.retry().await.unwrap();
    assert_eq!(turn.assistant_text(), Some("Up now."));
    assert_eq!(controller.transcript().len(), 1);
}

#[tokio::test]
async fn test_empty_retry_and_undo() {
    let provider = TestModelProvider::default();
    let mut controller = controller_with(&provider);

    for _ in 0..2 {
        assert!(controller.retry().await.is_none());
        assert!(controller.undo().is_none());
    }
    assert!(controller.transcript().is_empty());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let provider = TestModelProvider::with_script(replies(2));
    let mut controller = controller_with(&provider);
    controller.submit("a").await.unwrap();
    controller.submit("b").await.unwrap();

    controller.clear();
    assert!(controller.transcript().is_empty());
    assert!(controller.transcript().pending_inputs().is_empty());
    controller.clear();
    assert!(controller.transcript().is_empty());
    assert!(controller.transcript().pending_inputs().is_empty());
    assert!(controller.undo().is_none());
}

#[tokio::test]
async fn test_server_error_is_recorded() {
    let provider = TestModelProvider::with_script([
        PresetResponse::server_error(500, "internal error"),
    ]);
    let mut controller = controller_with(&provider);

    let turn = controller.submit("Hi").await.unwrap();
    assert_eq!(turn.assistant_text(), Some("Error: 500 - internal error"));
    assert_eq!(
        turn.outcome(),
        Some(&Outcome::Failed {
            kind: ErrorKind::Server,
            message: "Error: 500 - internal error".to_owned(),
        })
    );
}

#[tokio::test]
async fn test_transport_error_is_recorded() {
    let provider = TestModelProvider::with_script([
        PresetResponse::reply("Hello!"),
        PresetResponse::transport_error("connection refused"),
    ]);
    let mut controller = controller_with(&provider);
    controller.submit("Hi").await.unwrap();

    let turn = controller.submit("Still there?").await.unwrap();
    let text = turn.assistant_text().unwrap();
    assert!(text.contains("connection refused"));
    assert_eq!(controller.transcript().len(), 2);

    // The error text is replayed in the assistant's position.
    let next = controller
        .assembler()
        .assemble(controller.transcript().turns(), "Next");
    assert!(next.contains(
        "User: Still there?\nAssistant: Request failed: connection refused\n\
         User: Next\nAssistant:"
    ));
}

#[tokio::test]
async fn test_failed_turn_is_replayed() {
    let provider = TestModelProvider::with_script([
        PresetResponse::server_error(500, "internal error"),
        PresetResponse::reply("Back."),
    ]);
    let mut controller = controller_with(&provider);

    controller.submit("Hi").await.unwrap();
    controller.submit("Again").await.unwrap();
    assert_eq!(
        provider.prompts()[1],
        "Be brief.\n\n\
         User: Hi\nAssistant: Error: 500 - internal error\n\
         User: Again\nAssistant:"
    );
}

#[tokio::test]
async fn test_submit_keeps_text_verbatim() {
    let code = "    def f():\n        return 1\n";
    let provider = TestModelProvider::with_script(replies(1));
    let mut controller = controller_with(&provider);

    let turn = controller.submit(code).await.unwrap();
    assert_eq!(turn.user_text(), code);
    assert_eq!(
        provider.prompts(),
        [format!("Be brief.\n\nUser: {code}\nAssistant:")]
    );
    assert_eq!(controller.transcript().pending_inputs(), [code]);
    assert_eq!(controller.undo().as_deref(), Some(code));
}

#[tokio::test]
async fn test_history_window() {
    let provider = TestModelProvider::with_script(replies(3));
    let mut controller =
        ControllerBuilder::with_model_provider(provider.clone())
            .with_system_prompt(INSTRUCTION)
            .with_history_window(HistoryWindow::MaxTurns(1))
            .build();

    for msg in ["one", "two", "three"] {
        controller.submit(msg).await.unwrap();
    }
    assert_eq!(
        provider.prompts()[2],
        "Be brief.\n\nUser: two\nAssistant: reply 2\nUser: three\nAssistant:"
    );
    // The transcript itself is never trimmed.
    assert_eq!(controller.transcript().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_request() {
    let mut provider = TestModelProvider::with_script(replies(2));
    provider.set_delay(Duration::from_secs(10));
    let mut controller = controller_with(&provider);

    let res = timeout(Duration::from_secs(1), controller.submit("slow")).await;
    assert!(res.is_err());
    assert!(!controller.transcript().is_quiescent());

    controller.submit("next").await.unwrap();
    let turns = controller.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(
        turns[0].outcome().map(|o| o.is_reply()),
        Some(false),
        "the abandoned turn is marked failed"
    );
    assert_eq!(turns[1].assistant_text(), Some("reply 2"));
}
