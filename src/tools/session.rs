use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ToolError, ToolResult};

/// Where a tool instance is in its request lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// State of one tool instance.
///
/// At most one submission is in flight at a time: a submit that arrives while
/// the session is loading is refused with [`ToolError::Busy`] and its dispatch
/// closure is never called.
#[derive(Debug)]
pub struct ToolSession<T> {
    name: &'static str,
    state: Mutex<RequestState<T>>,
}

impl<T: Clone> ToolSession<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(RequestState::Idle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> RequestState<T> {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    /// Validates the input and, if it passes, runs the dispatch to completion.
    ///
    /// A validation failure moves the session straight to `Error` without
    /// issuing anything.
    pub async fn submit<V, F, Fut>(
        &self,
        validate: impl FnOnce() -> ToolResult<V>,
        dispatch: F,
    ) -> ToolResult<T>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        let input = {
            let mut state = self.lock();
            if state.is_loading() {
                tracing::debug!(tool = self.name, "submission refused while loading");
                return Err(ToolError::Busy);
            }

            match validate() {
                Ok(input) => {
                    *state = RequestState::Loading;
                    input
                }
                Err(e) => {
                    tracing::debug!(tool = self.name, "validation failed: {}", e);
                    *state = RequestState::Error(e.to_string());
                    return Err(e);
                }
            }
        };

        let guard = LoadingGuard { session: self };
        let result = dispatch(input).await;
        guard.finish(&result);

        result
    }

    fn lock(&self) -> MutexGuard<'_, RequestState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Puts the session back to idle if the dispatch future is dropped mid-flight.
struct LoadingGuard<'a, T: Clone> {
    session: &'a ToolSession<T>,
}

impl<T: Clone> LoadingGuard<'_, T> {
    fn finish(self, result: &ToolResult<T>) {
        let next = match result {
            Ok(payload) => RequestState::Success(payload.clone()),
            Err(e) => {
                tracing::warn!(tool = self.session.name, "request failed: {}", e);
                RequestState::Error(e.to_string())
            }
        };
        *self.session.lock() = next;
        std::mem::forget(self);
    }
}

impl<T: Clone> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        if state.is_loading() {
            *state = RequestState::Idle;
        }
    }
}
