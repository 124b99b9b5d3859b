// SPDX-License-Identifier: Apache-2.0

use azubi_prep_model::{ProgressState, Specialization};
use std::sync::Mutex;

/// Everything the view layer observes, as one immutable snapshot.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub specialization: Option<Specialization>,
    pub has_selected: bool,
    pub progress: ProgressState,
}

/// Subscription keys; one per independently changing slice of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKey {
    Specialization,
    Progress,
}

#[derive(Debug, Clone)]
pub enum StateEvent {
    SpecializationChanged {
        specialization_id: Specialization,
        update_categories: bool,
    },
    ProgressChanged {
        progress: ProgressState,
    },
}

impl StateEvent {
    #[must_use]
    pub const fn key(&self) -> StateKey {
        match self {
            Self::SpecializationChanged { .. } => StateKey::Specialization,
            Self::ProgressChanged { .. } => StateKey::Progress,
        }
    }
}

type Subscriber = Box<dyn Fn(&StateEvent) + Send + Sync>;

/// Process-wide observable state record with keyed subscription.
///
/// Subscribers run synchronously, in subscription order, after the
/// state they observe has been swapped; they receive snapshots, never
/// references into the store.
#[derive(Default)]
pub struct StateStore {
    state: Mutex<AppState>,
    subscribers: Mutex<Vec<(StateKey, Subscriber)>>,
}

impl StateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn progress(&self) -> ProgressState {
        self.snapshot().progress
    }

    pub fn subscribe(&self, key: StateKey, subscriber: impl Fn(&StateEvent) + Send + Sync + 'static) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push((key, Box::new(subscriber)));
        }
    }

    /// Boot-time restore; deliberately publishes nothing.
    pub fn rehydrate(&self, state: AppState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    pub fn update_progress(&self, progress: ProgressState) {
        if let Ok(mut current) = self.state.lock() {
            current.progress = progress.clone();
        }
        self.publish(&StateEvent::ProgressChanged { progress });
    }

    pub fn set_specialization(&self, specialization: Specialization, has_selected: bool) {
        if let Ok(mut current) = self.state.lock() {
            current.specialization = Some(specialization);
            current.has_selected = has_selected;
        }
        self.publish(&StateEvent::SpecializationChanged {
            specialization_id: specialization,
            update_categories: true,
        });
    }

    fn publish(&self, event: &StateEvent) {
        let Ok(subscribers) = self.subscribers.lock() else {
            return;
        };
        for (key, subscriber) in subscribers.iter() {
            if *key == event.key() {
                subscriber(event);
            }
        }
    }
}
