// cryptobeacon - encrypted status beacon decoder
//
// Discovers a single broadcaster, decodes and decrypts its densely packed
// advertisement payload, and escalates to a connection that exchanges
// token/confirmation messages over four negotiated channels.

pub mod broadcast;
pub mod capture;
pub mod channel;
pub mod codec;
pub mod config;
pub mod link;
pub mod notify;
pub mod peer;
pub mod transport;

pub use config::{AdvertFormat, BeaconConfig, ConfigError};
pub use link::{BeaconController, LinkState};
pub use notify::Notification;
