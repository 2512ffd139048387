// Peer module - WHO WE LISTEN TO
// Single active broadcaster selection and the stability (trust) gate

mod selector;

pub use selector::{ActivePeer, PeerId, PeerSelector, Selection};
