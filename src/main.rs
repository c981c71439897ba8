//! Terminal Tetris runner.
//!
//! Mounts the game component into a terminal host through the bridge, feeds
//! crossterm key events to the root element's handlers, and drives gravity
//! from a wall-clock timer.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{error, info};

use bridge_tetris::bridge::{Bridge, Session};
use bridge_tetris::config::AppConfig;
use bridge_tetris::input::{should_quit, to_host_event, HoldTracker};
use bridge_tetris::logging::{init_logging, install_panic_hook};
use bridge_tetris::term::{TerminalHost, TerminalRenderer, Viewport};
use bridge_tetris::timer::GravityTimer;

/// Upper bound on one poll so held keys are released on time
const FRAME_MS: u64 = 16;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    if init_logging(config.log_path.as_deref())? {
        install_panic_hook();
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(err) = &result {
        error!(error = %err, "game loop failed");
    }
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, config: &AppConfig) -> Result<()> {
    let host = TerminalHost::new();
    let container = host.container();

    let mut bridge = Bridge::new();
    bridge.register_host(host)?;

    let mut timer = GravityTimer::default();
    let mut session = Session::mount(config.app(clock_seed()), &mut bridge, container, &mut timer)?;

    let mut hold = HoldTracker::new("ArrowDown");
    let mut last_frame = Instant::now();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        if let Some(host) = bridge.host_mut() {
            term.present(host, Viewport::new(w, h))?;
        }

        let frame = Duration::from_millis(FRAME_MS);
        let timeout = timer
            .remaining(Instant::now())
            .map_or(frame, |left| left.min(frame));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && should_quit(key) {
                        break;
                    }
                    if let Some(host_event) = to_host_event(key) {
                        hold.observe(&host_event);
                        session.dispatch(&host_event, &mut bridge, &mut timer)?;
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let elapsed_ms = last_frame.elapsed().as_millis() as u32;
        if elapsed_ms > 0 {
            last_frame += Duration::from_millis(u64::from(elapsed_ms));
            if let Some(release) = hold.elapse(elapsed_ms) {
                session.dispatch(&release, &mut bridge, &mut timer)?;
            }
        }

        if timer.fire(Instant::now()) {
            session.on_gravity_tick(&mut bridge, &mut timer)?;
        }
    }

    info!(
        score = session.state().score(),
        level = session.state().level(),
        lines = session.state().lines(),
        "quit"
    );
    session.unmount(&mut bridge, &mut timer)?;
    Ok(())
}
