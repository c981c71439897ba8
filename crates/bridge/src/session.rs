//! Mounted application session
//!
//! A [`Session`] is the live top-level component: it owns the game state and
//! the last rendered tree. Every state change re-renders, diffs against the
//! previous tree, and applies the result through the bridge as a single
//! batch. Gravity timing is delegated to an external [`Scheduler`].

use thiserror::Error;
use tracing::{debug, info};

use bridge_tetris_core::{EngineError, GameState, Rules};
use bridge_tetris_types::{
    GameAction, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, FALLBACK_BOARD_HEIGHT,
};
use bridge_tetris_vdom::{diff, render_app, ReconcileError, VNode};

use crate::host::{HostHandle, HostRuntime};
use crate::runtime::{Bridge, BridgeError};

/// Component construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct App {
    pub width: i32,
    pub height: i32,
    pub seed: u32,
    pub rules: Rules,
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT)
    }
}

impl App {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            seed: 1,
            rules: Rules::default(),
        }
    }

    /// Props as a caller might pass them, with missing values replaced by
    /// the component's fallbacks (10 columns, 30 rows).
    pub fn from_partial(width: Option<i32>, height: Option<i32>) -> Self {
        Self::new(
            width.unwrap_or(DEFAULT_BOARD_WIDTH),
            height.unwrap_or(FALLBACK_BOARD_HEIGHT),
        )
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}

/// Timer owned by the host side. The session only tells it what interval it
/// wants; the host calls [`Session::on_gravity_tick`] when it fires.
pub trait Scheduler {
    fn set_interval(&mut self, interval_ms: u32);
    fn clear_interval(&mut self);
}

/// Scheduler that just remembers what it was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingScheduler {
    pub current: Option<u32>,
    pub history: Vec<Option<u32>>,
}

impl Scheduler for RecordingScheduler {
    fn set_interval(&mut self, interval_ms: u32) {
        self.current = Some(interval_ms);
        self.history.push(self.current);
    }

    fn clear_interval(&mut self) {
        self.current = None;
        self.history.push(None);
    }
}

/// Events delivered by the host to the root element's listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A key was pressed; the payload is a DOM-style code such as `"ArrowLeft"`
    KeyDown(String),
    KeyUp(String),
}

impl HostEvent {
    pub fn key_down(code: impl Into<String>) -> Self {
        HostEvent::KeyDown(code.into())
    }

    pub fn key_up(code: impl Into<String>) -> Self {
        HostEvent::KeyUp(code.into())
    }

    pub fn code(&self) -> &str {
        match self {
            HostEvent::KeyDown(code) | HostEvent::KeyUp(code) => code,
        }
    }
}

/// What a key event asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Action(GameAction),
    FastDrop(bool),
}

/// Key bindings of the top-level component
pub fn key_command(event: &HostEvent) -> Option<KeyCommand> {
    match event {
        HostEvent::KeyDown(code) => match code.as_str() {
            "ArrowLeft" => Some(KeyCommand::Action(GameAction::MoveLeft)),
            "ArrowRight" => Some(KeyCommand::Action(GameAction::MoveRight)),
            "ArrowUp" => Some(KeyCommand::Action(GameAction::RotateCw)),
            "ArrowDown" => Some(KeyCommand::FastDrop(true)),
            "Space" => Some(KeyCommand::Action(GameAction::HardDrop)),
            "KeyZ" => Some(KeyCommand::Action(GameAction::RotateCcw)),
            "KeyP" => Some(KeyCommand::Action(GameAction::Pause)),
            "KeyR" => Some(KeyCommand::Action(GameAction::Reset)),
            _ => None,
        },
        HostEvent::KeyUp(code) => match code.as_str() {
            "ArrowDown" => Some(KeyCommand::FastDrop(false)),
            _ => None,
        },
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// The mounted top-level component.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    tree: VNode,
    interval: Option<u32>,
}

impl Session {
    /// Build the game, render it, and mount the tree into `container`.
    pub fn mount<H: HostRuntime>(
        app: App,
        bridge: &mut Bridge<H>,
        container: HostHandle,
        scheduler: &mut impl Scheduler,
    ) -> Result<Self, SessionError> {
        let state = GameState::with_rules(app.width, app.height, app.seed, app.rules)?;
        let tree = render_app(&state);
        let created = bridge.mount(&tree, container)?;
        info!(
            width = app.width,
            height = app.height,
            seed = app.seed,
            nodes = created,
            "session mounted"
        );

        let mut session = Self {
            state,
            tree,
            interval: None,
        };
        session.sync_scheduler(scheduler);
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Tree produced by the last render
    pub fn tree(&self) -> &VNode {
        &self.tree
    }

    /// Gravity interval currently requested from the scheduler
    pub fn interval(&self) -> Option<u32> {
        self.interval
    }

    /// Route a host event through the root element's key handlers.
    ///
    /// Returns true if the game state changed.
    pub fn dispatch<H: HostRuntime>(
        &mut self,
        event: &HostEvent,
        bridge: &mut Bridge<H>,
        scheduler: &mut impl Scheduler,
    ) -> Result<bool, SessionError> {
        match key_command(event) {
            Some(KeyCommand::Action(action)) => self.apply(action, bridge, scheduler),
            Some(KeyCommand::FastDrop(enabled)) => {
                let changed = self.state.set_fast_drop(enabled);
                if changed {
                    debug!(enabled, "fast drop");
                    self.sync_scheduler(scheduler);
                }
                Ok(changed)
            }
            None => Ok(false),
        }
    }

    pub fn apply<H: HostRuntime>(
        &mut self,
        action: GameAction,
        bridge: &mut Bridge<H>,
        scheduler: &mut impl Scheduler,
    ) -> Result<bool, SessionError> {
        let changed = self.state.apply(action)?;
        self.after_change(changed, bridge, scheduler)
    }

    /// Scheduler callback
    pub fn on_gravity_tick<H: HostRuntime>(
        &mut self,
        bridge: &mut Bridge<H>,
        scheduler: &mut impl Scheduler,
    ) -> Result<bool, SessionError> {
        let changed = self.state.on_gravity_tick()?;
        self.after_change(changed, bridge, scheduler)
    }

    /// Tear down the mounted tree and stop gravity.
    pub fn unmount<H: HostRuntime>(
        self,
        bridge: &mut Bridge<H>,
        scheduler: &mut impl Scheduler,
    ) -> Result<(), SessionError> {
        if self.interval.is_some() {
            scheduler.clear_interval();
        }
        bridge.unmount()?;
        info!(score = self.state.score(), "session unmounted");
        Ok(())
    }

    fn after_change<H: HostRuntime>(
        &mut self,
        changed: bool,
        bridge: &mut Bridge<H>,
        scheduler: &mut impl Scheduler,
    ) -> Result<bool, SessionError> {
        if changed {
            if let Some(event) = self.state.take_last_event() {
                debug!(
                    kind = ?event.kind,
                    lines = event.lines_cleared,
                    points = event.points,
                    level = event.level,
                    "piece locked"
                );
            }
            self.rerender(bridge)?;
        }
        self.sync_scheduler(scheduler);
        Ok(changed)
    }

    fn rerender<H: HostRuntime>(&mut self, bridge: &mut Bridge<H>) -> Result<(), SessionError> {
        let next = render_app(&self.state);
        let patches = diff(&self.tree, &next)?;
        if !patches.is_empty() {
            bridge.apply_patches(&patches)?;
        }
        self.tree = next;
        Ok(())
    }

    fn sync_scheduler(&mut self, scheduler: &mut impl Scheduler) {
        let wanted = self
            .state
            .accepts_ticks()
            .then(|| self.state.gravity_interval_ms());
        if wanted == self.interval {
            return;
        }

        match wanted {
            Some(interval_ms) => scheduler.set_interval(interval_ms),
            None => scheduler.clear_interval(),
        }
        debug!(?wanted, "gravity interval changed");
        self.interval = wanted;
    }
}
