// Transport module - THE RADIO (abstract)
// Radio stack capability consumed by the controller, plus an in-memory simulator

mod ble;
mod traits;

pub use traits::{
    // Core trait
    RadioTransport,
    // Events and errors
    RadioPower, TransportError, TransportEvent,
};

pub use ble::{RadioCommand, SimulatedRadio};
