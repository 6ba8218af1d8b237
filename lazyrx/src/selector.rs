use std::fmt;
use std::sync::Arc;

/// A pure projection from store state to a derived value.
///
/// Selectors are cheap to clone and can be shared between tasks. The store
/// suppresses consecutive equal outputs, so a selector only has to be pure.
pub struct Selector<S, U> {
    project: Arc<dyn Fn(&S) -> U + Send + Sync>,
}

/// Builds a [`Selector`] from a projection function.
pub fn create_selector<S, U, F>(project: F) -> Selector<S, U>
where
    F: Fn(&S) -> U + Send + Sync + 'static,
{
    Selector {
        project: Arc::new(project),
    }
}

impl<S, U> Selector<S, U> {
    pub fn select(&self, state: &S) -> U {
        (self.project)(state)
    }

    /// Composes a projector on top of this selector.
    pub fn map<V, F>(self, projector: F) -> Selector<S, V>
    where
        S: 'static,
        U: 'static,
        F: Fn(U) -> V + Send + Sync + 'static,
    {
        let parent = self.project;
        Selector {
            project: Arc::new(move |state: &S| projector(parent(state))),
        }
    }
}

impl<S, U> Clone for Selector<S, U> {
    fn clone(&self) -> Self {
        Selector {
            project: Arc::clone(&self.project),
        }
    }
}

impl<S, U> fmt::Debug for Selector<S, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector").finish_non_exhaustive()
    }
}
