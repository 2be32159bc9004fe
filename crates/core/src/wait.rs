// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Future returned by `wait_for_bind`

use crate::error::RefError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

enum State<T> {
    /// Slot was already bound when the wait was registered
    Ready(Option<T>),
    Pending(oneshot::Receiver<T>),
}

/// Resolves with the bound handle
///
/// When the slot is already bound the first poll returns `Ready`, so the
/// fast path never yields to the scheduler. A pending wait resolves with
/// `WaitCancelled` if its slot rejects outstanding waiters.
pub struct WaitForBind<T> {
    slot: String,
    state: State<T>,
}

// The handle is moved out, never pinned in place.
impl<T> Unpin for WaitForBind<T> {}

impl<T> WaitForBind<T> {
    pub(crate) fn ready(slot: &str, target: T) -> Self {
        Self {
            slot: slot.to_string(),
            state: State::Ready(Some(target)),
        }
    }

    pub(crate) fn pending(slot: &str, rx: oneshot::Receiver<T>) -> Self {
        Self {
            slot: slot.to_string(),
            state: State::Pending(rx),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Whether the slot was bound at registration time
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(Some(_)))
    }
}

impl<T> Future for WaitForBind<T> {
    type Output = Result<T, RefError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Ready(target) => match target.take() {
                Some(target) => Poll::Ready(Ok(target)),
                None => Poll::Ready(Err(RefError::WaitCancelled {
                    slot: this.slot.clone(),
                })),
            },
            State::Pending(rx) => Pin::new(rx).poll(cx).map(|res| {
                res.map_err(|_| RefError::WaitCancelled {
                    slot: this.slot.clone(),
                })
            }),
        }
    }
}
