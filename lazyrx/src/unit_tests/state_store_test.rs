use crate::unit_tests::{reducer, settings, title, users, TestAction, TestState};
use crate::{select_lazy, LazyError, LazyStreamExt, SelectLazy, StateStore, Store};
use futures::stream::StreamExt;
use futures_signals::signal::SignalExt;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

fn new_store() -> StateStore<TestState, TestAction> {
    StateStore::new(TestState::default(), reducer)
}

async fn settled_settings(store: &StateStore<TestState, TestAction>) -> u32 {
    store
        .select(&settings())
        .first_not_pending()
        .await
        .expect("settings settle")
}

#[tokio::test]
async fn test_dispatch_runs_reducer() {
    let store = new_store();
    store.dispatch(TestAction::SetTitle("profile".to_string()));

    let state = store.await_state().await.unwrap();
    assert_eq!(state.title, "profile");
}

#[tokio::test]
async fn test_set_state_and_get_state() {
    let store = new_store();
    store.set_state(|state| TestState {
        logged_in: false,
        ..state
    });

    let state = store.await_state().await.unwrap();
    assert!(!state.logged_in);
    assert!(!store.get_state().logged_in);
}

#[tokio::test]
async fn test_with_state() {
    let store = new_store();
    store.dispatch(TestAction::SetTitle("inbox".to_string()));

    let (tx, rx) = tokio::sync::oneshot::channel();
    store.with_state(move |state| {
        let _ = tx.send(state.title);
    });
    assert_eq!(rx.await.unwrap(), "inbox");
}

#[tokio::test]
async fn test_select_skips_unchanged_values() {
    let store = new_store();
    let mut titles = store.select(&title());
    assert_eq!(titles.next().await, Some("home".to_string()));

    store.dispatch(TestAction::SetLoggedIn(false));
    store.dispatch(TestAction::SetTitle("settings".to_string()));

    assert_eq!(titles.next().await, Some("settings".to_string()));
}

#[tokio::test]
async fn test_actions_are_published_after_reduce() {
    let store = new_store();
    let mut actions = store.actions();
    let observer = store.clone();

    store.dispatch(TestAction::SetTitle("a".to_string()));
    store.dispatch(TestAction::SetTitle("b".to_string()));

    assert_eq!(actions.next().await, Some(TestAction::SetTitle("a".to_string())));
    assert_eq!(actions.next().await, Some(TestAction::SetTitle("b".to_string())));
    assert_eq!(observer.await_state().await.unwrap().title, "b");
}

#[tokio::test]
async fn test_effect_completes_lazy_load() {
    let store = new_store();
    let effect = store.register_effect(|action| async move {
        match action {
            TestAction::LoadUsers => {
                sleep(Duration::from_millis(10)).await;
                Some(TestAction::UsersLoaded(vec!["ada".to_string(), "grace".to_string()]))
            }
            _ => None,
        }
    });

    let users_query =
        select_lazy(SelectLazy::new(store.clone(), users()).load_action(TestAction::LoadUsers));
    let loaded = users_query.first_not_pending().await;

    assert_eq!(loaded, Ok(vec!["ada".to_string(), "grace".to_string()]));
    effect.abort();
}

#[tokio::test]
async fn test_async_load() {
    let store = new_store();
    store.async_load(
        |state: &mut TestState| &mut state.settings,
        async {
            sleep(Duration::from_millis(10)).await;
            Ok::<u32, String>(42)
        },
    );

    assert_eq!(settled_settings(&store).await, 42);
    let state = store.await_state().await.unwrap();
    assert!(state.settings.is_ready());
    assert!(!state.settings.has_error());
}

#[tokio::test]
async fn test_async_load_marks_pending() {
    let store = new_store();
    store.async_load(|state: &mut TestState| &mut state.settings, async {
        sleep(Duration::from_millis(50)).await;
        7u32
    });

    sleep(Duration::from_millis(10)).await;
    let state = store.await_state().await.unwrap();
    assert!(state.settings.pending);
    assert!(!state.settings.fetched);

    assert_eq!(settled_settings(&store).await, 7);
}

#[tokio::test]
async fn test_to_signal_follows_load_progress() {
    let store = new_store();
    let mut states = store.to_signal().to_stream();
    let initial = states.next().await.unwrap();
    assert!(initial.settings.should_load());

    store.async_load(|state: &mut TestState| &mut state.settings, async {
        sleep(Duration::from_millis(20)).await;
        5u32
    });

    let mut saw_pending = false;
    let mut loaded = None;
    while let Some(state) = states.next().await {
        if state.settings.pending {
            saw_pending = true;
        }
        if state.settings.is_ready() {
            loaded = Some(state.settings.into_data());
            break;
        }
    }
    assert!(saw_pending);
    assert_eq!(loaded, Some(5));
}

#[tokio::test]
async fn test_load_blocking_failure_retains_data() {
    let store = new_store();
    store.set_state(|state| TestState {
        settings: state.settings.resolve(3),
        ..state
    });
    store.load(|state: &mut TestState| &mut state.settings, || {
        Err::<u32, String>("disk unavailable".to_string())
    });

    sleep(Duration::from_millis(50)).await;
    let state = store.await_state().await.unwrap();
    assert!(state.settings.is_ready());
    assert_eq!(state.settings.data, 3);
    assert_eq!(
        state.settings.error,
        Some(LazyError::Error("disk unavailable".to_string()))
    );
}

#[tokio::test]
async fn test_async_load_with_timeout() {
    let store = new_store();
    store.async_load_with_timeout(
        |state: &mut TestState| &mut state.settings,
        async {
            sleep(Duration::from_millis(200)).await;
            1u32
        },
        Duration::from_millis(20),
    );

    assert_eq!(settled_settings(&store).await, 0);
    let state = store.await_state().await.unwrap();
    assert_eq!(state.settings.error, Some(LazyError::Timeout));
}

#[tokio::test]
async fn test_async_load_cancellable() {
    let store = new_store();
    let token = CancellationToken::new();
    store.async_load_cancellable(
        token.clone(),
        |state: &mut TestState| &mut state.settings,
        |token| async move {
            tokio::select! {
                _ = token.cancelled() => None,
                _ = sleep(Duration::from_millis(500)) => Some(9u32),
            }
        },
    );

    sleep(Duration::from_millis(20)).await;
    token.cancel();

    assert_eq!(settled_settings(&store).await, 0);
    let state = store.await_state().await.unwrap();
    assert_eq!(state.settings.error, Some(LazyError::Cancelled));
}
