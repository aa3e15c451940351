//! Integration tests for the streaming chat session
//!
//! Tests history loading, the send pipeline and chat deletion against a
//! scripted backend.

mod common;

use common::{ScriptedBackend, Step, text};
use narutoverse::error::ChatError;
use narutoverse::session::{ChatSession, SendOutcome};
use narutoverse::types::{ChatMessage, Sender, ThreadId};
use std::sync::Arc;

const NARUTO: u64 = 11;

fn session_with(backend: ScriptedBackend) -> (Arc<ScriptedBackend>, ChatSession) {
    let backend = Arc::new(backend);
    let session = ChatSession::new(
        backend.clone(),
        Some(ThreadId::new("thread-abc")),
        NARUTO,
    );
    (backend, session)
}

mod history_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_becomes_transcript() {
        let (_, mut session) =
            session_with(ScriptedBackend::new().with_history(vec![ChatMessage::human("hi")]));
        assert!(session.is_loading());

        session.load_history().await.expect("history should load");

        assert_eq!(session.messages(), &[ChatMessage::human("hi")]);
        assert!(!session.is_loading());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_history_failure_keeps_loading() {
        let (_, mut session) = session_with(ScriptedBackend {
            history_status: Some(503),
            ..ScriptedBackend::new()
        });

        let err = session.load_history().await.unwrap_err();

        assert!(matches!(err, ChatError::BadResponse { status: 503, .. }));
        assert!(session.is_loading());
        assert!(session.messages().is_empty());
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn test_history_waits_for_thread_id() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut session = ChatSession::new(backend.clone(), None, NARUTO);

        let err = session.load_history().await.unwrap_err();

        assert!(matches!(err, ChatError::NotReady(_)));
        assert_eq!(ScriptedBackend::calls(&backend.history_calls), 0);
    }

    #[tokio::test]
    async fn test_history_steps_match_load_history() {
        let (backend, mut session) =
            session_with(ScriptedBackend::new().with_history(vec![ChatMessage::agent("yo")]));

        let target = session.history_target().unwrap();
        assert_eq!(target.thread_id, ThreadId::new("thread-abc"));
        assert_eq!(target.character_id, NARUTO);
        let fetched = target.fetch_history(backend.as_ref()).await;
        session.finish_history(fetched).unwrap();

        assert_eq!(session.messages(), &[ChatMessage::agent("yo")]);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_history_step_failure_keeps_loading() {
        let (_, mut session) = session_with(ScriptedBackend::new());

        let err = session
            .finish_history(Err(ChatError::Transport("reset".into())))
            .unwrap_err();

        assert!(matches!(err, ChatError::Transport(_)));
        assert!(session.is_loading());
        assert!(session.last_error().is_some());
    }
}

mod send_tests {
    use super::*;

    #[test]
    fn test_begin_send_appends_before_any_response() {
        let (backend, mut session) = session_with(ScriptedBackend::new());
        session.set_draft("  Teach me Rasengan  ");

        let pending = session
            .begin_send("  Teach me Rasengan  ")
            .expect("send should start");

        assert_eq!(pending.query, "Teach me Rasengan");
        assert_eq!(
            session.messages(),
            &[
                ChatMessage::human("Teach me Rasengan"),
                ChatMessage::agent("")
            ]
        );
        assert!(session.is_sending());
        assert_eq!(session.draft(), "");
        assert_eq!(session.transcript().streaming_index(), Some(1));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chunks_are_concatenated() {
        let (_, mut session) =
            session_with(ScriptedBackend::new().with_reply(vec![text("He"), text("llo")]));

        let outcome = session.send("hi").await;

        assert!(matches!(outcome, SendOutcome::Completed));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1], ChatMessage::agent("Hello"));
        assert!(!session.is_sending());
        assert_eq!(session.transcript().streaming_index(), None);
    }

    #[tokio::test]
    async fn test_split_code_point_decodes_cleanly() {
        let reply = "影分身の術！";
        let bytes = reply.as_bytes();
        let (_, mut session) = session_with(ScriptedBackend::new().with_reply(vec![
            Step::Chunk(bytes[..4].to_vec()),
            Step::Chunk(bytes[4..11].to_vec()),
            Step::Chunk(bytes[11..].to_vec()),
        ]));

        session.send("jutsu?").await;

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, reply);
        assert!(!last.text.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_send_while_sending_is_noop() {
        let (_, mut session) = session_with(ScriptedBackend::new());
        session.begin_send("first").unwrap();

        let outcome = session.send("second").await;

        assert!(outcome.is_rejected());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].text, "first");
    }

    #[tokio::test]
    async fn test_whitespace_input_is_noop() {
        let (backend, mut session) = session_with(ScriptedBackend::new());
        session.set_draft(" \t\n");

        let outcome = session.send(" \t\n").await;

        assert!(outcome.is_rejected());
        assert!(session.messages().is_empty());
        assert!(!session.is_sending());
        assert_eq!(session.draft(), " \t\n");
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_thread_id_is_rejected() {
        let mut session = ChatSession::new(Arc::new(ScriptedBackend::new()), None, NARUTO);

        let outcome = session.send("hello").await;

        assert!(outcome.is_rejected());
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_request_body_carries_query_character_and_thread() {
        let (backend, mut session) = session_with(ScriptedBackend::new());

        session.send("  Believe it  ").await;

        let requests = backend.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[serde_json::json!({
                "query": "Believe it",
                "character_id": NARUTO,
                "thread_id": "thread-abc",
            })]
        );
    }

    #[tokio::test]
    async fn test_transport_error_keeps_partial_reply() {
        let (_, mut session) = session_with(
            ScriptedBackend::new().with_reply(vec![text("Dattebay"), Step::Fail("reset")]),
        );

        let outcome = session.send("say it").await;

        match outcome {
            SendOutcome::Failed(ChatError::Transport(message)) => assert_eq!(message, "reset"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!session.is_sending());
        assert_eq!(session.messages()[1], ChatMessage::agent("Dattebay"));
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn test_refused_stream_leaves_empty_placeholder() {
        let (_, mut session) = session_with(ScriptedBackend {
            open_status: Some(500),
            ..ScriptedBackend::new()
        });

        let outcome = session.send("hello").await;

        assert!(matches!(
            outcome,
            SendOutcome::Failed(ChatError::BadResponse { status: 500, .. })
        ));
        assert!(!session.is_sending());
        assert_eq!(
            session.messages(),
            &[ChatMessage::human("hello"), ChatMessage::agent("")]
        );
    }

    #[tokio::test]
    async fn test_abandoned_send_clears_sending() {
        let (_, mut session) = session_with(ScriptedBackend {
            reply: vec![text("partial")],
            hold_open: true,
            ..ScriptedBackend::new()
        });

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            session.send("are you there?"),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!session.is_sending());
        assert_eq!(session.messages()[1].text, "partial");
        assert_eq!(session.transcript().streaming_index(), None);
    }

    #[tokio::test]
    async fn test_consecutive_sends_extend_transcript() {
        let (_, mut session) =
            session_with(ScriptedBackend::new().with_reply(vec![text("ok")]));

        session.send("one").await;
        session.send("two").await;

        let senders: Vec<_> = session.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            [Sender::Human, Sender::Agent, Sender::Human, Sender::Agent]
        );
        assert_eq!(session.messages()[2].text, "two");
    }
}

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_success_clears_transcript() {
        let (backend, mut session) = session_with(
            ScriptedBackend::new()
                .with_history(vec![ChatMessage::human("hi"), ChatMessage::agent("yo")]),
        );
        session.load_history().await.unwrap();

        session.delete_chat().await.expect("delete should succeed");

        assert!(session.messages().is_empty());
        assert_eq!(ScriptedBackend::calls(&backend.delete_calls), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_transcript() {
        let (_, mut session) = session_with(ScriptedBackend {
            history: vec![ChatMessage::human("hi")],
            delete_status: Some(500),
            ..ScriptedBackend::new()
        });
        session.load_history().await.unwrap();

        let err = session.delete_chat().await.unwrap_err();

        assert!(matches!(err, ChatError::BadResponse { status: 500, .. }));
        assert_eq!(session.messages(), &[ChatMessage::human("hi")]);
    }

    #[tokio::test]
    async fn test_delete_refused_while_sending() {
        let (backend, mut session) = session_with(ScriptedBackend::new());
        session.begin_send("wait").unwrap();

        let err = session.delete_chat().await.unwrap_err();

        assert!(matches!(err, ChatError::InvalidState(_)));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(ScriptedBackend::calls(&backend.delete_calls), 0);
    }

    #[test]
    fn test_begin_delete_checks_state() {
        let (_, mut session) = session_with(ScriptedBackend::new());
        assert!(session.begin_delete().is_ok());

        session.begin_send("wait").unwrap();
        assert!(matches!(session.begin_delete(), Err(ChatError::InvalidState(_))));

        let backend = Arc::new(ScriptedBackend::new());
        let unresolved = ChatSession::new(backend, None, NARUTO);
        assert!(matches!(unresolved.begin_delete(), Err(ChatError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_delete_steps_clear_only_on_success() {
        let (backend, mut session) = session_with(ScriptedBackend {
            history: vec![ChatMessage::human("hi")],
            delete_status: Some(502),
            ..ScriptedBackend::new()
        });
        session.load_history().await.unwrap();

        let target = session.begin_delete().unwrap();
        let deleted = target.delete(backend.as_ref()).await;
        assert!(session.finish_delete(deleted).is_err());
        assert_eq!(session.messages().len(), 1);
        assert!(session.last_error().is_some());

        session.finish_delete(Ok(())).unwrap();
        assert!(session.messages().is_empty());
        assert!(session.last_error().is_none());
    }
}
