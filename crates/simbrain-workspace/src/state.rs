// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Updater lifecycle state, stored in a single atomic

use std::sync::atomic::{AtomicU8, Ordering};

/// Updater state
///
/// ```text
/// Idle ──run/iterate──> Running ──done──> Idle
///                          │
///                        stop
///                          v
///                       Stopping ──cycle finished──> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UpdaterState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl UpdaterState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => UpdaterState::Running,
            2 => UpdaterState::Stopping,
            _ => UpdaterState::Idle,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(UpdaterState::Idle as u8))
    }

    pub(crate) fn load(&self) -> UpdaterState {
        UpdaterState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: UpdaterState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move `from -> to`, returning the actual state on failure
    pub(crate) fn transition(&self, from: UpdaterState, to: UpdaterState) -> Result<(), UpdaterState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(UpdaterState::from_u8)
    }
}
