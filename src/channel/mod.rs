// Channel module - THE CONNECTED PHASE
// The four negotiated channels, their discovery set and value decoding

mod io;
mod set;

pub use io::{decode_update, encode_text};
pub use set::{Channel, ChannelSet};
