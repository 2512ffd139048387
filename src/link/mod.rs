// Link module - THE LIFECYCLE
// Connection state machine, its timers and the async session that drives it

mod controller;
mod session;
mod state;
mod timer;

pub use controller::BeaconController;
pub use session::{run_session, Intent};
pub use state::LinkState;
pub use timer::{Deadline, TimerKind, Timers};
