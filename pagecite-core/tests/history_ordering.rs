mod common;

use std::sync::Arc;

use pagecite_core::{App, Exchange, QuerySession, SessionConfig, Settled, StaticQaEngine};
use proptest::prelude::*;

use common::{cited, fake_pdf, FakeRenderer, ScriptedEngine};

fn ready_session() -> QuerySession {
    let mut session = QuerySession::new(&SessionConfig::default());
    session.on_load_started(1);
    session.on_document_ready(pagecite_core::DocumentContext {
        document_id: uuid::Uuid::new_v4(),
        name: None,
        page_count: 10,
        bytes: Arc::from(&b"%PDF-"[..]),
    });
    session
}

proptest! {
    #[test]
    fn history_matches_submission_order_for_any_response_order(
        order in (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let mut session = ready_session();
        let tickets: Vec<_> = (0..order.len())
            .map(|i| session.submit(&format!("question {}", i)).unwrap().ticket)
            .collect();

        for &i in &order {
            session.settle(tickets[i], Ok(vec![cited("a", "b", 1)]));
        }

        prop_assert_eq!(session.history().len(), order.len());
        for (i, exchange) in session.history().iter().enumerate() {
            prop_assert_eq!(exchange.question(), format!("question {}", i));
        }
        prop_assert_eq!(session.pending_count(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn slow_first_answer_is_not_overtaken() {
    let engine = ScriptedEngine::default()
        .answer("slow", 500, vec![cited("first", "one", 1)])
        .answer("fast", 10, vec![cited("second", "two", 2)]);
    let mut app = App::new(Arc::new(FakeRenderer::default()), Arc::new(engine));
    app.load_and_wait(fake_pdf("a.pdf", 4)).await;

    let slow = app.submit_question("slow").unwrap();
    let fast = app.submit_question("fast").unwrap();

    let (slow_done, fast_done) = tokio::join!(slow.wait(), fast.wait());

    // Apply in arrival order: the fast answer lands first
    assert_eq!(app.apply_answer(fast_done), Settled::Committed(0));
    assert!(app.history().is_empty());
    assert_eq!(app.pending_questions(), 2);

    assert_eq!(app.apply_answer(slow_done), Settled::Committed(2));
    let questions: Vec<_> = app.history().iter().map(Exchange::question).collect();
    assert_eq!(questions, ["slow", "fast"]);
}

#[tokio::test]
async fn every_submission_appends_exactly_one_exchange() {
    let engine = StaticQaEngine::new(vec![cited("a", "x", 1), cited("b", "y", 2), cited("c", "z", 1)]);
    let mut app = App::new(Arc::new(FakeRenderer::default()), Arc::new(engine));
    app.load_and_wait(fake_pdf("a.pdf", 4)).await;

    for i in 0..5 {
        app.ask(&format!("q{}", i)).await.unwrap();
    }

    assert_eq!(app.history().len(), 5);
    assert!(app.history().iter().all(|exchange| exchange.answers().len() == 3));
}
