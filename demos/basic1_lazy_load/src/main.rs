use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use lazyrx::{
    create_lazy, create_selector, select_lazy, Lazy, LazyStreamExt, SelectLazy, Selector, State,
    StateStore, Store,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

mod tracing_setup;

#[derive(Debug, Clone, PartialEq)]
struct Profile {
    name: String,
    followers: u32,
}

#[derive(Debug, Clone)]
struct AppState {
    profile: Lazy<Option<Profile>>,
    signed_in: bool,
    notice: String,
}

impl State for AppState {}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            profile: create_lazy(None),
            signed_in: false,
            notice: "idle".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Action {
    SignIn,
    LoadProfile,
    ProfileLoaded(Profile),
    Notify(String),
}

fn reducer(state: AppState, action: &Action) -> AppState {
    match action {
        Action::SignIn => AppState {
            signed_in: true,
            ..state
        },
        Action::LoadProfile => AppState {
            profile: state.profile.clone().start_loading(),
            ..state
        },
        Action::ProfileLoaded(profile) => AppState {
            profile: state.profile.clone().resolve(Some(profile.clone())),
            ..state
        },
        Action::Notify(notice) => AppState {
            notice: notice.clone(),
            ..state
        },
    }
}

fn profile() -> Selector<AppState, Lazy<Option<Profile>>> {
    create_selector(|state: &AppState| state.profile.clone())
}

fn signed_in() -> Selector<AppState, bool> {
    create_selector(|state: &AppState| state.signed_in)
}

fn notice() -> Selector<AppState, String> {
    create_selector(|state: &AppState| state.notice.clone())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init();

    info!("  Main thread | Create store");
    let store = StateStore::new(AppState::default(), reducer);

    let _effect = store.register_effect(|action| async move {
        match action {
            Action::LoadProfile => {
                debug!("Worker thread | fetching profile");
                sleep(Duration::from_millis(100)).await;
                Some(Action::ProfileLoaded(Profile {
                    name: "ada".to_string(),
                    followers: 1815,
                }))
            }
            _ => None,
        }
    });

    info!("==========================================");
    warn!("example: the guard holds the load back until the user signs in.");

    let profile_query = select_lazy(
        SelectLazy::new(store.clone(), profile())
            .load_action(Action::LoadProfile)
            .when(signed_in()),
    );

    let mut watcher = profile_query.clone();
    if let Some(lazy) = watcher.next().await {
        info!(
            "  Main thread | fetched: {}, pending: {}",
            lazy.fetched, lazy.pending
        );
    }

    store.dispatch(Action::SignIn);
    sleep(Duration::from_millis(10)).await;

    info!("==========================================");
    warn!("example: first_not_pending() waits for the loaded data.");

    // The gate only watches the profile, it never triggers a load itself.
    let profile_watch = select_lazy(SelectLazy::new(store.clone(), profile()));
    let notices = store
        .select(&notice())
        .skip_until_lazy_loaded(profile_watch);
    let notice_task = tokio::spawn(async move {
        notices
            .take(1)
            .for_each(|notice| async move {
                info!("  Main thread | notice after load: {}", notice);
            })
            .await;
    });

    store.dispatch(Action::Notify("this notice is dropped".to_string()));

    let loaded = profile_query.first_not_pending().await?;
    info!("  Main thread | profile loaded: {:?}", loaded);

    store.dispatch(Action::Notify("welcome back".to_string()));
    notice_task.await?;

    info!("==========================================");
    let state = store.await_state().await?;
    info!("  Main thread | final state: {:?}", state);
    Ok(())
}
