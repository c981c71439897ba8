//! Bridge runtime between the reconciler and a host UI runtime.
//!
//! The host is supplied from outside through the [`HostRuntime`] trait and
//! registered once on a [`Bridge`]. From then on every render is shipped to
//! the host as one ordered patch batch.
//!
//! - [`host`]: the host contract and opaque handles
//! - [`runtime`]: `Bridge` (register, mount, apply, unmount)
//! - [`recording`]: an in-memory host that logs calls, for tests and embedders
//! - [`session`]: the mounted top-level component and the scheduler contract
//!
//! ```
//! use bridge_tetris_bridge::{App, Bridge, RecordingHost, RecordingScheduler, Session};
//!
//! let mut host = RecordingHost::new();
//! let container = host.create_container("div");
//!
//! let mut bridge = Bridge::new();
//! bridge.register_host(host).unwrap();
//!
//! let mut scheduler = RecordingScheduler::default();
//! let session = Session::mount(App::default(), &mut bridge, container, &mut scheduler).unwrap();
//! assert_eq!(scheduler.current, Some(500));
//! assert!(bridge.host().unwrap().tree(container).is_some());
//! # drop(session);
//! ```

pub mod host;
pub mod recording;
pub mod runtime;
pub mod session;

pub use bridge_tetris_core as core;
pub use bridge_tetris_vdom as vdom;

pub use host::{HostError, HostHandle, HostRuntime};
pub use recording::{HostCall, Instance, InstanceKind, InstanceTree, RecordingHost};
pub use runtime::{decode_batch, encode_batch, Bridge, BridgeError};
pub use session::{
    key_command, App, HostEvent, KeyCommand, RecordingScheduler, Scheduler, Session, SessionError,
};
