use crate::{create_lazy, create_selector, Lazy, Selector, State};

mod state_store_test;

#[derive(Clone, Debug, PartialEq)]
pub struct TestState {
    pub users: Lazy<Vec<String>>,
    pub settings: Lazy<u32>,
    pub logged_in: bool,
    pub title: String,
}

impl State for TestState {}

impl Default for TestState {
    fn default() -> Self {
        TestState {
            users: create_lazy(Vec::new()),
            settings: create_lazy(0),
            logged_in: true,
            title: "home".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TestAction {
    LoadUsers,
    UsersLoaded(Vec<String>),
    LoadSettings,
    SettingsLoaded(u32),
    SetTitle(String),
    SetLoggedIn(bool),
}

pub fn reducer(state: TestState, action: &TestAction) -> TestState {
    match action {
        TestAction::LoadUsers => TestState {
            users: state.users.clone().start_loading(),
            ..state
        },
        TestAction::UsersLoaded(users) => TestState {
            users: state.users.clone().resolve(users.clone()),
            ..state
        },
        TestAction::LoadSettings => TestState {
            settings: state.settings.start_loading(),
            ..state
        },
        TestAction::SettingsLoaded(value) => TestState {
            settings: state.settings.resolve(*value),
            ..state
        },
        TestAction::SetTitle(title) => TestState {
            title: title.clone(),
            ..state
        },
        TestAction::SetLoggedIn(logged_in) => TestState {
            logged_in: *logged_in,
            ..state
        },
    }
}

pub fn users() -> Selector<TestState, Lazy<Vec<String>>> {
    create_selector(|state: &TestState| state.users.clone())
}

pub fn settings() -> Selector<TestState, Lazy<u32>> {
    create_selector(|state: &TestState| state.settings.clone())
}

pub fn logged_in() -> Selector<TestState, bool> {
    create_selector(|state: &TestState| state.logged_in)
}

pub fn title() -> Selector<TestState, String> {
    create_selector(|state: &TestState| state.title.clone())
}

pub fn count(actions: &[TestAction], target: &TestAction) -> usize {
    actions.iter().filter(|action| *action == target).count()
}
