// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn engine behavior over a real SQLite ledger and checkpoint store.

use std::sync::Arc;

use thoth_agent::TurnOptions;
use thoth_config::{OverflowPolicy, ThothConfig};
use thoth_core::traits::{CheckpointStore, ThreadLedger};
use thoth_core::types::{ContextFragment, Message, RetrievalFlags, Role, SourceKind, ThreadId};
use thoth_core::ThothError;
use thoth_test_utils::{MockRetriever, TestHarness};

fn wiki() -> Arc<MockRetriever> {
    Arc::new(MockRetriever::returning(
        SourceKind::Encyclopedia,
        vec![ContextFragment::new(
            "Paris is the capital of France.",
            "https://en.wikipedia.org/wiki/Paris",
        )],
    ))
}

#[tokio::test]
async fn fresh_thread_has_no_state() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();
    assert!(h.engine.state(&id).await.is_none());
    assert!(h.engine.history(&id).await.is_empty());
}

#[tokio::test]
async fn each_turn_appends_user_then_assistant() {
    let h = TestHarness::builder()
        .with_mock_responses(vec!["No", "one", "No", "two", "No", "three"])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    for (i, q) in ["first?", "second?", "third?"].iter().enumerate() {
        let outcome = h.ask(&id, q).await.unwrap();
        assert_eq!(outcome.version, i as u64 + 1);
        let history = h.engine.history(&id).await;
        assert_eq!(history.len(), 2 * (i + 1));
        assert_eq!(history[2 * i], Message::user(*q));
        assert_eq!(history[2 * i + 1].role, Role::Assistant);
        assert_eq!(history[2 * i + 1].content, outcome.answer);
    }
    assert_eq!(
        CheckpointStore::versions(h.storage.as_ref(), &id).await.unwrap(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn all_flags_off_means_no_lookups_and_no_compression() {
    let source = wiki();
    let h = TestHarness::builder()
        .with_retriever(source.clone())
        .with_mock_responses(vec!["Yes", "answer without context"])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    let outcome = h
        .ask_with_flags(&id, "anything?", RetrievalFlags::none())
        .await
        .unwrap();

    assert!(outcome.retrieved);
    assert_eq!(outcome.fragments, 0);
    assert_eq!(outcome.answer, "answer without context");
    assert_eq!(source.calls(), 0);
    assert_eq!(h.engine.fanout().invocations(), 0);
    assert_eq!(h.provider.call_count().await, 2);

    let state = h.engine.state(&id).await.unwrap();
    assert!(state.context.is_empty());
    assert_eq!(state.flags, RetrievalFlags::none());
}

#[tokio::test]
async fn failing_source_is_skipped_and_others_compressed() {
    let encyclopedia = wiki();
    let academic = Arc::new(MockRetriever::failing(SourceKind::Academic));
    let web = Arc::new(MockRetriever::returning(
        SourceKind::Web,
        vec![ContextFragment::new(
            "France's capital city is Paris.",
            "https://example.com/france",
        )],
    ));
    let h = TestHarness::builder()
        .with_retriever(encyclopedia.clone())
        .with_retriever(academic.clone())
        .with_retriever(web.clone())
        .with_mock_responses(vec![
            "yes",
            "Paris is the capital of France. (Source: https://en.wikipedia.org/wiki/Paris)",
            "Paris (Source: https://en.wikipedia.org/wiki/Paris)",
        ])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    let outcome = h.ask(&id, "What is the capital of France?").await.unwrap();
    assert_eq!(outcome.fragments, 2);
    assert_eq!(academic.calls(), 1);

    let prompts = h.provider.prompts().await;
    let compression = &prompts[1];
    assert!(compression.contains("(Source: https://en.wikipedia.org/wiki/Paris)"));
    assert!(compression.contains("(Source: https://example.com/france)"));
    let wiki_at = compression.find("Paris is the capital").unwrap();
    let web_at = compression.find("France's capital city").unwrap();
    assert!(wiki_at < web_at);

    let state = h.engine.state(&id).await.unwrap();
    assert_eq!(state.context.len(), 1);
    assert!(!state.context[0].is_empty());
    assert!(prompts[2].contains(&state.context[0]));
}

#[tokio::test]
async fn negative_classification_never_reaches_the_fanout() {
    let source = wiki();
    let h = TestHarness::builder()
        .with_retriever(source.clone())
        .with_mock_responses(vec![
            "Yes",
            "Paris is the capital of France. (Source: wiki)",
            "Paris.",
            "No",
            "Still Paris.",
        ])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    h.ask(&id, "Capital of France?").await.unwrap();
    let invocations = h.engine.fanout().invocations();
    assert_eq!(source.calls(), 1);

    let outcome = h.ask(&id, "And again?").await.unwrap();
    assert!(!outcome.retrieved);
    assert_eq!(h.engine.fanout().invocations(), invocations);
    assert_eq!(source.calls(), 1);

    let prompts = h.provider.prompts().await;
    assert!(prompts[3].contains("Existing Context: Paris is the capital of France. (Source: wiki)"));
    let state = h.engine.state(&id).await.unwrap();
    assert_eq!(state.context.len(), 1);
    assert_eq!(state.answer.as_deref(), Some("Still Paris."));
}

#[tokio::test]
async fn classification_error_is_treated_as_no() {
    let source = wiki();
    let h = TestHarness::builder()
        .with_retriever(source.clone())
        .build()
        .await
        .unwrap();
    h.provider.add_failure("classifier down").await;
    h.provider.add_response("answered anyway").await;
    let id = ThreadId::generate();

    let outcome = h.ask(&id, "q?").await.unwrap();
    assert!(!outcome.retrieved);
    assert_eq!(outcome.answer, "answered anyway");
    assert_eq!(source.calls(), 0);
    assert_eq!(h.provider.call_count().await, 2);
}

#[tokio::test]
async fn generation_failure_persists_nothing() {
    let h = TestHarness::builder()
        .with_mock_responses(vec!["No", "first answer", "No"])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();
    h.ask(&id, "first?").await.unwrap();
    h.provider.add_failure("model crashed").await;

    let err = h.ask(&id, "second?").await.unwrap_err();
    assert!(matches!(err, ThothError::Provider { .. }));

    let state = h.engine.state(&id).await.unwrap();
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.answer.as_deref(), Some("first answer"));
    assert_eq!(
        CheckpointStore::versions(h.storage.as_ref(), &id).await.unwrap(),
        vec![1]
    );

    // The thread keeps working afterwards.
    h.provider.add_response("No").await;
    h.provider.add_response("recovered").await;
    let outcome = h.ask(&id, "third?").await.unwrap();
    assert_eq!(outcome.answer, "recovered");
    assert_eq!(h.engine.history(&id).await.len(), 4);
}

#[tokio::test]
async fn compression_failure_fails_the_turn() {
    let h = TestHarness::builder()
        .with_retriever(wiki())
        .build()
        .await
        .unwrap();
    h.provider.add_response("Yes").await;
    h.provider.add_failure("compression crashed").await;
    let id = ThreadId::generate();

    assert!(h.ask(&id, "q?").await.is_err());
    assert!(h.engine.state(&id).await.is_none());
    assert!(h.engine.thread(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn first_question_names_the_thread() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();

    h.ask(&id, "What is the capital of France?").await.unwrap();
    let thread = h.engine.thread(&id).await.unwrap().unwrap();
    assert_eq!(thread.name, "What is the capital of France?");
    assert!(!thread.auto_named);

    h.ask(&id, "And of Germany?").await.unwrap();
    let thread = h.engine.thread(&id).await.unwrap().unwrap();
    assert_eq!(thread.name, "What is the capital of France?");
}

#[tokio::test]
async fn named_threads_keep_their_name() {
    let h = TestHarness::builder().build().await.unwrap();
    let thread = h.engine.new_thread(Some("Research")).await.unwrap();
    assert!(!thread.auto_named);

    h.ask(&thread.id, "Unrelated question").await.unwrap();
    let thread = h.engine.thread(&thread.id).await.unwrap().unwrap();
    assert_eq!(thread.name, "Research");

    let unnamed = h.engine.new_thread(None).await.unwrap();
    assert!(unnamed.auto_named);
    assert!(unnamed.name.starts_with("Thread "));
    assert_eq!(h.engine.list_threads().await.unwrap().len(), 2);
}

#[tokio::test]
async fn rename_rejects_blank_names() {
    let h = TestHarness::builder().build().await.unwrap();
    let thread = h.engine.new_thread(None).await.unwrap();
    let err = h.engine.rename_thread(&thread.id, "   ").await.unwrap_err();
    assert!(matches!(err, ThothError::InvalidInput(_)));

    h.engine.rename_thread(&thread.id, "Trips").await.unwrap();
    let renamed = h.engine.thread(&thread.id).await.unwrap().unwrap();
    assert_eq!(renamed.name, "Trips");
}

#[tokio::test]
async fn deleting_a_thread_purges_its_checkpoints() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();
    h.ask(&id, "one").await.unwrap();
    h.ask(&id, "two").await.unwrap();

    assert!(h.engine.delete_thread(&id).await.unwrap());
    assert!(h.engine.state(&id).await.is_none());
    assert!(ThreadLedger::get(h.storage.as_ref(), &id).await.unwrap().is_none());
    assert!(CheckpointStore::versions(h.storage.as_ref(), &id)
        .await
        .unwrap()
        .is_empty());
    assert!(!h.engine.delete_thread(&id).await.unwrap());
}

#[tokio::test]
async fn turn_model_overrides_default() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();

    let outcome = h
        .engine
        .run_turn(&id, "hi", TurnOptions::default().with_model("llama3.2:3b"))
        .await
        .unwrap();
    assert_eq!(outcome.model, "llama3.2:3b");
    let requests = h.provider.requests().await;
    assert!(requests.iter().all(|r| r.model == "llama3.2:3b"));

    let outcome = h.ask(&id, "again").await.unwrap();
    assert_eq!(outcome.model, h.engine.default_model());
}

#[tokio::test]
async fn blank_question_is_rejected_before_any_call() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();
    let err = h.ask(&id, "  \n ").await.unwrap_err();
    assert!(matches!(err, ThothError::InvalidInput(_)));
    assert_eq!(h.provider.call_count().await, 0);
    assert!(h.engine.thread(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_turns_on_one_thread_serialize() {
    let h = TestHarness::builder().build().await.unwrap();
    let id = ThreadId::generate();

    let (a, b) = tokio::join!(h.ask(&id, "left"), h.ask(&id, "right"));
    let mut versions = vec![a.unwrap().version, b.unwrap().version];
    versions.sort();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(h.engine.history(&id).await.len(), 4);
}

#[tokio::test]
async fn thread_locks_are_released_after_turns() {
    let h = TestHarness::builder().build().await.unwrap();
    let first = ThreadId::generate();
    let second = ThreadId::generate();

    h.ask(&first, "one").await.unwrap();
    h.ask(&second, "two").await.unwrap();
    let (a, b) = tokio::join!(h.ask(&first, "three"), h.ask(&first, "four"));
    a.unwrap();
    b.unwrap();
    assert_eq!(h.engine.active_threads(), 0);

    h.provider.add_failure("model offline").await;
    h.provider.add_failure("model offline").await;
    assert!(h.ask(&second, "five").await.is_err());
    assert_eq!(h.engine.active_threads(), 0);

    h.engine.delete_thread(&first).await.unwrap();
    assert_eq!(h.engine.active_threads(), 0);
}

const PARIS_BLOCK: &str =
    "Paris is the capital and most populous city of France. (Source: https://en.wikipedia.org/wiki/Paris)";
const SEINE_BLOCK: &str =
    "The Seine flows through Paris on its way to the English Channel. (Source: https://en.wikipedia.org/wiki/Seine)";
const CONDENSED: &str = "Paris is France's capital. (Source: https://en.wikipedia.org/wiki/Paris)";

/// Budget that holds either block alone but not both together.
fn tight_context(overflow: OverflowPolicy) -> ThothConfig {
    let mut config = ThothConfig::default();
    config.context.max_context_chars =
        PARIS_BLOCK.chars().count() + SEINE_BLOCK.chars().count() - 1;
    config.context.overflow = overflow;
    config
}

#[tokio::test]
async fn overflowing_turn_checkpoints_summarized_context() {
    assert!(CONDENSED.len() < PARIS_BLOCK.len());
    let h = TestHarness::builder()
        .with_config(tight_context(OverflowPolicy::Summarize))
        .with_retriever(wiki())
        .with_mock_responses(vec![
            "yes",
            PARIS_BLOCK,
            "Paris.",
            "yes",
            SEINE_BLOCK,
            CONDENSED,
            "The Seine.",
        ])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    h.ask(&id, "What is the capital of France?").await.unwrap();
    assert_eq!(h.engine.state(&id).await.unwrap().context, vec![PARIS_BLOCK]);

    let outcome = h.ask(&id, "Which river runs through it?").await.unwrap();
    assert_eq!(outcome.answer, "The Seine.");

    let state = h.engine.state(&id).await.unwrap();
    assert_eq!(state.context, vec![CONDENSED, SEINE_BLOCK]);

    let prompts = h.provider.prompts().await;
    assert_eq!(prompts.len(), 7);
    assert!(prompts[5].contains(PARIS_BLOCK));
    assert!(!prompts[5].contains(SEINE_BLOCK));
    assert!(prompts[6].contains(CONDENSED));
    assert!(prompts[6].contains(SEINE_BLOCK));
}

#[tokio::test]
async fn overflowing_turn_checkpoints_truncated_context() {
    let h = TestHarness::builder()
        .with_config(tight_context(OverflowPolicy::Truncate))
        .with_retriever(wiki())
        .with_mock_responses(vec![
            "yes",
            PARIS_BLOCK,
            "Paris.",
            "yes",
            SEINE_BLOCK,
            "The Seine.",
        ])
        .build()
        .await
        .unwrap();
    let id = ThreadId::generate();

    h.ask(&id, "What is the capital of France?").await.unwrap();
    h.ask(&id, "Which river runs through it?").await.unwrap();

    let state = h.engine.state(&id).await.unwrap();
    assert_eq!(state.context, vec![SEINE_BLOCK]);
    assert_eq!(h.provider.call_count().await, 6);
    assert_eq!(
        CheckpointStore::versions(h.storage.as_ref(), &id).await.unwrap(),
        vec![1, 2]
    );
}
