use std::time::{Duration, Instant};

use cvmatch_core::{update, AppState, AppViewModel, Msg, Notice, Preferences};
use cvmatch_logging::{cvm_debug, cvm_trace};

use super::effects::EffectRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives `update` and feeds engine replies back in until nothing is outstanding.
pub(crate) struct Session {
    state: AppState,
    runner: EffectRunner,
    outstanding: usize,
}

impl Session {
    pub(crate) fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            outstanding: 0,
        }
    }

    /// Builds the state with the preferences already stored by the runner.
    pub(crate) fn with_stored_preferences(
        config: cvmatch_core::SessionConfig,
        runner: EffectRunner,
    ) -> Self {
        let preferences = Preferences::load(runner.store());
        Self::new(AppState::with_config(config, preferences), runner)
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) {
        let mut inbox = vec![msg];
        while let Some(msg) = inbox.pop() {
            cvm_trace!("dispatch {:?}", msg);
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            let dispatched = self.runner.run(effects);
            self.outstanding += dispatched.awaited;
            inbox.extend(dispatched.immediate);
        }
    }

    /// Sends `msg` and waits for every request it caused, including follow-ups.
    pub(crate) fn dispatch_and_settle(&mut self, msg: Msg) {
        self.dispatch(msg);
        self.settle();
    }

    pub(crate) fn settle(&mut self) {
        self.settle_until(None);
    }

    /// Like [`Session::settle`], but gives up after `limit`. Returns whether everything settled.
    pub(crate) fn settle_for(&mut self, limit: Duration) -> bool {
        self.settle_until(Some(Instant::now() + limit))
    }

    fn settle_until(&mut self, deadline: Option<Instant>) -> bool {
        while self.outstanding > 0 {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                cvm_debug!("Session still waiting on {} request(s)", self.outstanding);
                return false;
            }
            let Some(reply) = self.runner.next_reply(POLL_INTERVAL) else {
                continue;
            };
            if reply.settles {
                self.outstanding -= 1;
            }
            if let Some(msg) = reply.msg {
                self.dispatch(msg);
            }
        }
        cvm_debug!("Session settled");
        true
    }

    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    pub(crate) fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.state.notice()
    }
}
