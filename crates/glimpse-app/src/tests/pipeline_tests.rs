use glimpse_types::{AnalysisOutcome, AppEvent, CaptureMode, Rect};
use tokio_util::sync::CancellationToken;

use super::support::{
    FakeScreen, ScriptedProvider, deltas_for, events_until_finished, harness, next_event,
};
use crate::events::capture::start_capture;

#[tokio::test]
async fn test_window_capture_streams_to_ui() {
    let provider = ScriptedProvider::answering(&["Hello ", "world"]);
    let requests = provider.requests.clone();
    let h = harness(provider, FakeScreen { frontmost: Some(7) }, "sk-test");

    let session = start_capture(&h.ctx, CaptureMode::ActiveWindow, &CancellationToken::new())
        .await
        .unwrap()
        .expect("window should resolve");

    let events = events_until_finished(&h.events, session).await;

    let ready = events
        .iter()
        .position(|e| matches!(e, AppEvent::CaptureReady { .. }))
        .expect("CaptureReady missing");
    let first_delta = events
        .iter()
        .position(|e| matches!(e, AppEvent::AnalysisDelta { .. }))
        .expect("no deltas");
    assert!(ready < first_delta);

    match &events[ready] {
        AppEvent::CaptureReady {
            session: s,
            thumbnail,
            saved_to,
            previous_focus,
        } => {
            assert_eq!(*s, session);
            // Owner of the captured window gets focus back on dismiss
            assert_eq!(*previous_focus, Some(7));
            assert_eq!((thumbnail.width, thumbnail.height), (200, 100));
            let path = saved_to.as_ref().expect("capture should be saved");
            assert!(path.starts_with(h.dir.path().join("captures")));
            assert!(path.exists());
        }
        _ => unreachable!(),
    }

    assert_eq!(deltas_for(&events, session), "Hello world");
    assert!(matches!(
        events.last(),
        Some(AppEvent::AnalysisFinished {
            outcome: AnalysisOutcome::Completed,
            ..
        })
    ));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].png.starts_with(b"\x89PNG"));
    assert_eq!(requests[0].api_key, "sk-test");

    let status = h.ctx.state.status.snapshot().await;
    assert_eq!(status.capture_count, 1);
    assert!(status.last_capture_time.is_some());
    assert!(!status.capturing);
    assert_eq!(h.ctx.state.active_session(), None);
}

#[tokio::test]
async fn test_region_capture_is_cropped_to_selection() {
    let h = harness(
        ScriptedProvider::answering(&["ok"]),
        FakeScreen { frontmost: Some(7) },
        "sk-test",
    );
    let selection = Rect::new(10.0, 20.0, 100.0, 50.0);

    let session = start_capture(
        &h.ctx,
        CaptureMode::Region(selection),
        &CancellationToken::new(),
    )
    .await
    .unwrap()
    .unwrap();

    let events = events_until_finished(&h.events, session).await;
    let (thumbnail, previous_focus) = events
        .iter()
        .find_map(|e| match e {
            AppEvent::CaptureReady {
                thumbnail,
                previous_focus,
                ..
            } => Some((thumbnail.clone(), *previous_focus)),
            _ => None,
        })
        .unwrap();
    assert_eq!((thumbnail.width, thumbnail.height), (100, 50));
    // Focus was looked up before the overlay opened
    assert_eq!(previous_focus, None);
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let provider = ScriptedProvider::answering(&["never"]);
    let requests = provider.requests.clone();
    let h = harness(provider, FakeScreen { frontmost: Some(7) }, "");

    let session = start_capture(&h.ctx, CaptureMode::Display, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    let events = events_until_finished(&h.events, session).await;

    // The window still shows the capture, with an alert instead of text
    assert!(
        events
            .iter()
            .any(|e| matches!(e, AppEvent::CaptureReady { .. }))
    );
    assert!(matches!(
        events.last(),
        Some(AppEvent::AnalysisFinished {
            outcome: AnalysisOutcome::Failed { message },
            ..
        }) if message == "No API key configured"
    ));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nothing_to_capture_without_frontmost_app() {
    let h = harness(
        ScriptedProvider::answering(&["never"]),
        FakeScreen { frontmost: None },
        "sk-test",
    );

    let started = start_capture(&h.ctx, CaptureMode::ActiveWindow, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(started, None);
    assert_eq!(h.ctx.state.status.snapshot().await.error_count, 1);
    assert!(h.events.is_empty());
}

#[tokio::test]
async fn test_new_capture_supersedes_running_session() {
    let h = harness(
        ScriptedProvider::stalling(&["first "]),
        FakeScreen { frontmost: Some(7) },
        "sk-test",
    );
    let cancel = CancellationToken::new();

    let first = start_capture(&h.ctx, CaptureMode::ActiveWindow, &cancel)
        .await
        .unwrap()
        .unwrap();
    loop {
        if let AppEvent::AnalysisDelta { session, .. } = next_event(&h.events).await {
            assert_eq!(session, first);
            break;
        }
    }

    let second = start_capture(&h.ctx, CaptureMode::Display, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(h.ctx.state.active_session(), Some(second));

    let events = events_until_finished(&h.events, first).await;
    assert!(matches!(
        events.last(),
        Some(AppEvent::AnalysisFinished {
            outcome: AnalysisOutcome::Cancelled,
            ..
        })
    ));
    // The first session's end must not clear the second one
    assert_eq!(h.ctx.state.active_session(), Some(second));

    cancel.cancel();
    events_until_finished(&h.events, second).await;
}

#[tokio::test]
async fn test_cancelled_selection_leaves_running_session_alone() {
    let h = harness(
        ScriptedProvider::stalling(&["still going"]),
        FakeScreen { frontmost: Some(7) },
        "sk-test",
    );
    let cancel = CancellationToken::new();

    let running = start_capture(&h.ctx, CaptureMode::ActiveWindow, &cancel)
        .await
        .unwrap()
        .unwrap();

    let started = start_capture(&h.ctx, CaptureMode::Region(Rect::ZERO), &cancel)
        .await
        .unwrap();

    assert_eq!(started, None);
    assert_eq!(h.ctx.state.active_session(), Some(running));
    assert_eq!(h.ctx.state.status.snapshot().await.error_count, 0);

    cancel.cancel();
}
