// Beacon Controller - the connection lifecycle state machine
//
// Sole owner of the active peer, extras ledger, snapshot, channel set and
// timers. Every input is handled to completion before the next one, and
// results leave only through the notification channel.

use super::state::LinkState;
use super::timer::{Deadline, TimerKind, Timers};
use crate::broadcast::{
    Broadcast, BroadcastParser, DecodedBroadcast, ExtrasLedger, LatestSnapshot, PayloadText,
};
use crate::channel::{decode_update, encode_text, Channel, ChannelSet};
use crate::codec::{AdvertDecoder, Cipher};
use crate::config::BeaconConfig;
use crate::notify::{Notification, NotificationReceiver, NotificationSender};
use crate::peer::{ActivePeer, PeerId, PeerSelector, Selection};
use crate::transport::{RadioPower, RadioTransport, TransportError, TransportEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Connection lifecycle controller for one beacon session
pub struct BeaconController<T, C> {
    config: BeaconConfig,
    transport: T,
    cipher: C,
    decoder: AdvertDecoder,
    state: LinkState,
    selector: PeerSelector,
    ledger: ExtrasLedger,
    snapshot: LatestSnapshot,
    channels: ChannelSet,
    timers: Timers,
    /// Peer of the current connect attempt or link
    link_peer: Option<PeerId>,
    power: Option<RadioPower>,
    notifier: NotificationSender,
    /// Set once the notification receiver is found dropped
    receiver_gone: bool,
}

impl<T: RadioTransport, C: Cipher> BeaconController<T, C> {
    /// Create a controller and the receiver its notifications are delivered on
    pub fn new(transport: T, cipher: C, config: BeaconConfig) -> (Self, NotificationReceiver) {
        let (notifier, notifications) = mpsc::unbounded_channel();
        let controller = Self {
            decoder: AdvertDecoder::new(config.advert.clone()),
            selector: PeerSelector::new(config.stability_threshold),
            config,
            transport,
            cipher,
            state: LinkState::Idle,
            ledger: ExtrasLedger::new(),
            snapshot: LatestSnapshot::new(),
            channels: ChannelSet::new(),
            timers: Timers::new(),
            link_peer: None,
            power: None,
            notifier,
            receiver_gone: false,
        };
        (controller, notifications)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Get the lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Get the active peer
    pub fn active_peer(&self) -> Option<&ActivePeer> {
        self.selector.active()
    }

    pub fn ledger(&self) -> &ExtrasLedger {
        &self.ledger
    }

    pub fn snapshot(&self) -> &LatestSnapshot {
        &self.snapshot
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Last power state reported by the radio
    pub fn power(&self) -> Option<RadioPower> {
        self.power
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Earliest armed timer, if any
    pub fn next_deadline(&self) -> Option<Deadline> {
        self.timers.next()
    }

    /// Currently armed deadline of one timer
    pub fn armed(&self, kind: TimerKind) -> Option<Deadline> {
        self.timers.armed(kind)
    }

    // ========================================================================
    // APPLICATION REQUESTS
    // ========================================================================

    /// Start scanning for the beacon
    pub fn start_scan(&mut self) {
        if !matches!(self.state, LinkState::Idle | LinkState::Disconnected) {
            debug!(state = %self.state, "start_scan ignored");
            return;
        }
        if let Err(e) = self.transport.start_scan() {
            warn!(error = %e, "failed to start scan");
            return;
        }
        self.set_state(LinkState::Scanning);
    }

    /// Stop scanning without connecting
    pub fn stop_scan(&mut self) {
        if self.state != LinkState::Scanning {
            debug!(state = %self.state, "stop_scan ignored");
            return;
        }
        if let Err(e) = self.transport.stop_scan() {
            warn!(error = %e, "failed to stop scan");
        }
        self.timers.cancel(TimerKind::AdvertisementLoss);
        self.set_state(LinkState::Idle);
    }

    /// Connect to the active peer
    pub fn connect(&mut self) {
        if self.state != LinkState::Scanning {
            debug!(state = %self.state, "connect ignored");
            return;
        }
        let Some(identity) = self.selector.active().map(|p| p.identity().clone()) else {
            debug!("connect ignored: no active peer");
            return;
        };

        self.timers.cancel(TimerKind::AdvertisementLoss);
        self.timers.arm(
            TimerKind::ConnectTimeout,
            Instant::now(),
            self.config.connect_timeout(),
        );
        self.link_peer = Some(identity.clone());
        self.set_state(LinkState::Connecting);

        if let Err(e) = self.transport.connect(&identity) {
            self.fail_attempt(&e.to_string(), false);
        }
    }

    /// Tear down the current link or connect attempt
    pub fn disconnect(&mut self) {
        if !self.state.has_link() {
            debug!(state = %self.state, "disconnect ignored");
            return;
        }
        if let Some(identity) = self.link_peer.take() {
            if let Err(e) = self.transport.disconnect(&identity) {
                warn!(peer = %identity, error = %e, "disconnect request failed");
            }
        }
        if let Err(e) = self.transport.stop_scan() {
            warn!(error = %e, "failed to stop scan");
        }
        self.timers.cancel_all();
        self.snapshot.clear();
        self.selector.clear();
        self.channels.clear();
        self.set_state(LinkState::Disconnected);
        self.emit(Notification::Disconnected);
    }

    /// Write a token to the token channel
    pub fn send_token(&mut self, text: &str) {
        self.send_text(Channel::Token, text);
    }

    /// Write a confirmation to the confirmation channel
    pub fn send_confirmation(&mut self, text: &str) {
        self.send_text(Channel::Confirmation, text);
    }

    /// Re-emit every field held in the snapshot
    pub fn replay_latest(&mut self) {
        for notification in self.snapshot.replay() {
            self.emit(notification);
        }
    }

    fn send_text(&mut self, channel: Channel, text: &str) {
        if !self.channels.contains(channel) {
            debug!(%channel, "write ignored: channel not discovered");
            return;
        }
        if let Err(e) = self.transport.write(channel.uuid(), &encode_text(text)) {
            channel_request_failed(channel, "write", &e);
        }
    }

    // ========================================================================
    // RADIO EVENTS
    // ========================================================================

    /// Handle one event from the radio stack
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PowerChanged(power) => self.on_power(power),
            TransportEvent::PeerDiscovered {
                identity,
                signal_strength,
                advertisement,
            } => self.on_advertisement(&identity, signal_strength, &advertisement),
            TransportEvent::LinkEstablished { identity } => self.on_link_established(&identity),
            TransportEvent::LinkFailed { identity, error } => {
                if self.is_attempt_for(&identity) {
                    let reason = error.unwrap_or_else(|| "link failed".to_string());
                    self.fail_attempt(&reason, false);
                }
            }
            TransportEvent::LinkDropped { identity, error } => {
                self.on_link_dropped(&identity, error)
            }
            TransportEvent::ChannelDiscovered { channel_id } => {
                self.on_channel_discovered(&channel_id)
            }
            TransportEvent::NotificationStateChanged {
                channel_id,
                enabled,
                error,
            } => {
                if let Some(e) = error {
                    warn!(channel = %channel_id, error = %e, "notification state change failed");
                } else if enabled {
                    self.read_back(&channel_id);
                }
            }
            TransportEvent::ChannelValueUpdated {
                channel_id,
                value,
                error,
            } => {
                if let Some(e) = error {
                    warn!(channel = %channel_id, error = %e, "channel update failed");
                } else {
                    self.on_channel_value(&channel_id, &value);
                }
            }
            TransportEvent::WriteAcknowledged { channel_id, error } => {
                if let Some(e) = error {
                    warn!(channel = %channel_id, error = %e, "write failed");
                } else {
                    self.read_back(&channel_id);
                }
            }
        }
    }

    fn on_power(&mut self, power: RadioPower) {
        info!(%power, "radio power changed");
        self.power = Some(power);
        match power {
            RadioPower::On => self.emit(Notification::PowerOn),
            RadioPower::Off => self.emit(Notification::PowerOff),
            _ => {}
        }
    }

    fn on_advertisement(&mut self, identity: &PeerId, signal_strength: i16, advertisement: &str) {
        if self.state != LinkState::Scanning {
            trace!(state = %self.state, "advertisement ignored");
            return;
        }
        if signal_strength > 0 {
            debug!(peer = %identity, signal_strength, "invalid signal strength");
            return;
        }

        let frame = match self.decoder.decode(advertisement, &self.cipher) {
            Ok(frame) => frame,
            Err(e) if e.is_foreign() => {
                trace!(peer = %identity, "not a beacon advertisement");
                return;
            }
            Err(e) => {
                debug!(peer = %identity, error = %e, "malformed advertisement dropped");
                return;
            }
        };

        match self.selector.observe(identity, signal_strength) {
            Selection::Ignored | Selection::Rejected => return,
            Selection::Created | Selection::Replaced => {
                info!(peer = %identity, signal_strength, "active peer selected")
            }
            Selection::Counted if self.selector.is_trusted() => {
                info!(peer = %identity, "active peer trusted")
            }
            Selection::Counted | Selection::Frozen => {}
        }
        let trusted = self.selector.is_trusted();

        match BroadcastParser::parse(&frame) {
            Broadcast::Reset(status) => {
                debug!(peer = %identity, %status, "broadcaster reset");
                self.selector.clear();
                self.emit(Notification::Status(status));
            }
            Broadcast::Update(decoded) => self.apply_update(decoded, trusted),
        }

        self.timers.arm(
            TimerKind::AdvertisementLoss,
            Instant::now(),
            self.config.advertisement_timeout(),
        );
    }

    /// Fold a decoded broadcast into the ledger, then surface it if trusted
    fn apply_update(&mut self, decoded: DecodedBroadcast, trusted: bool) {
        if let Some(record) = &decoded.extras {
            self.ledger.apply(record);
        }
        if !trusted {
            return;
        }

        if let Some(status) = decoded.status {
            self.snapshot.status = Some(status);
            self.emit(Notification::Status(status));
        }
        if let Some(icon) = decoded.icon {
            self.snapshot.icon = Some(icon);
            self.emit(Notification::Icon(icon.to_string()));
        }
        if decoded.primary_value != 0 {
            self.snapshot.primary_value = Some(decoded.primary_value);
            self.emit(Notification::Value1(decoded.primary_value));
        }
        self.snapshot.secondary_value = Some(decoded.secondary_value);
        self.emit(Notification::Value2(decoded.secondary_value));

        match decoded.text {
            Some(PayloadText::Text(text)) => {
                self.snapshot.text = Some(text.clone());
                self.emit(Notification::Text(text));
            }
            Some(PayloadText::Identifier1(id)) => {
                self.snapshot.identifier_1 = Some(id.clone());
                self.emit(Notification::Identifier1(id));
            }
            Some(PayloadText::Identifier2(id)) => {
                self.snapshot.identifier_2 = Some(id.clone());
                self.emit(Notification::Identifier2(id));
            }
            None => {}
        }

        if decoded.extras.is_some() {
            let entries = self.ledger.entries();
            self.snapshot.extras = Some(entries.clone());
            self.emit(Notification::Extras(entries));
        }
    }

    fn is_attempt_for(&self, identity: &PeerId) -> bool {
        let current = self.link_peer.as_ref() == Some(identity);
        if !current || !self.state.is_connecting() {
            debug!(peer = %identity, state = %self.state, "stale link event");
            return false;
        }
        true
    }

    fn on_link_established(&mut self, identity: &PeerId) {
        if self.state != LinkState::Connecting || self.link_peer.as_ref() != Some(identity) {
            debug!(peer = %identity, state = %self.state, "stale link event");
            return;
        }
        self.channels.clear();
        self.set_state(LinkState::DiscoveringChannels);
        if let Err(e) = self.transport.enumerate_channels(identity) {
            self.fail_attempt(&e.to_string(), true);
        }
    }

    fn on_link_dropped(&mut self, identity: &PeerId, error: Option<String>) {
        if self.link_peer.as_ref() != Some(identity) || !self.state.has_link() {
            debug!(peer = %identity, state = %self.state, "stale link event");
            return;
        }
        if let Some(e) = &error {
            warn!(peer = %identity, error = %e, "link dropped with error");
        }
        if self.state != LinkState::Connected {
            self.fail_attempt(error.as_deref().unwrap_or("link dropped"), false);
            return;
        }

        self.link_peer = None;
        self.timers.cancel_all();
        self.snapshot.clear();
        self.selector.clear();
        self.channels.clear();
        self.set_state(LinkState::Disconnected);
        self.emit(Notification::Disconnected);
    }

    fn on_channel_discovered(&mut self, channel_id: &str) {
        if self.state != LinkState::DiscoveringChannels {
            debug!(channel = %channel_id, state = %self.state, "late channel discovery discarded");
            return;
        }
        let Some(channel) = Channel::from_uuid(channel_id) else {
            trace!(channel = %channel_id, "unrelated channel");
            return;
        };

        if self.channels.insert(channel) && channel.is_notifying() {
            if let Err(e) = self.transport.subscribe(channel.uuid()) {
                channel_request_failed(channel, "subscribe", &e);
            }
        }

        if self.channels.is_complete() {
            self.timers.cancel_all();
            if let Err(e) = self.transport.stop_scan() {
                warn!(error = %e, "failed to stop scan");
            }
            self.snapshot.clear();
            self.set_state(LinkState::Connected);
            self.emit(Notification::Connected);
        }
    }

    fn read_back(&mut self, channel_id: &str) {
        if !self.state.has_link() {
            return;
        }
        match Channel::from_uuid(channel_id) {
            Some(channel) => {
                if let Err(e) = self.transport.read(channel.uuid()) {
                    channel_request_failed(channel, "read", &e);
                }
            }
            None => trace!(channel = %channel_id, "unrelated channel"),
        }
    }

    fn on_channel_value(&mut self, channel_id: &str, value: &[u8]) {
        if !self.state.has_link() {
            debug!(channel = %channel_id, state = %self.state, "channel update without link");
            return;
        }
        if let Some(notification) = Channel::from_uuid(channel_id).and_then(|c| decode_update(c, value)) {
            self.emit(notification);
        }
    }

    // ========================================================================
    // TIMERS
    // ========================================================================

    /// Handle an expired deadline; stale deadlines are ignored
    pub fn on_deadline(&mut self, deadline: Deadline) {
        if !self.timers.take(&deadline) {
            trace!(kind = ?deadline.kind(), "stale deadline ignored");
            return;
        }
        match deadline.kind() {
            TimerKind::AdvertisementLoss if self.state == LinkState::Scanning => {
                self.on_broadcast_lost()
            }
            TimerKind::ConnectTimeout if self.state.is_connecting() => self.on_connect_timeout(),
            kind => debug!(?kind, state = %self.state, "timer expired outside its state"),
        }
    }

    /// Fire every deadline that has passed
    pub fn poll_timers(&mut self) {
        for deadline in self.timers.due(Instant::now()) {
            self.on_deadline(deadline);
        }
    }

    fn on_broadcast_lost(&mut self) {
        info!("broadcast lost");
        self.selector.clear();
        if let Err(e) = self.transport.start_scan() {
            warn!(error = %e, "failed to restart scan");
        }
        self.emit(Notification::BroadcastLost);
    }

    fn on_connect_timeout(&mut self) {
        warn!(state = %self.state, "connect timed out");
        self.snapshot.clear();
        self.channels.clear();
        if let Some(identity) = self.link_peer.take() {
            if let Err(e) = self.transport.disconnect(&identity) {
                debug!(peer = %identity, error = %e, "cancel of pending link failed");
            }
        }
        self.set_state(LinkState::Scanning);
        self.emit(Notification::ConnectFailed);
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// End the current connect attempt as failed
    fn fail_attempt(&mut self, reason: &str, cancel_link: bool) {
        warn!(reason, "connect attempt failed");
        self.timers.cancel(TimerKind::ConnectTimeout);
        self.snapshot.clear();
        self.channels.clear();
        if let Some(identity) = self.link_peer.take() {
            if cancel_link {
                if let Err(e) = self.transport.disconnect(&identity) {
                    debug!(peer = %identity, error = %e, "cancel of failed link failed");
                }
            }
        }
        self.set_state(LinkState::Disconnected);
        self.emit(Notification::ConnectFailed);
    }

    fn set_state(&mut self, next: LinkState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(&next) {
            warn!(from = %self.state, to = %next, "unexpected state transition");
        }
        info!(from = %self.state, to = %next, "link state changed");
        self.state = next;
    }

    fn emit(&mut self, notification: Notification) {
        if notification.is_lifecycle() {
            info!(%notification, "notify");
        } else {
            trace!(%notification, "notify");
        }
        if self.notifier.send(notification).is_err() && !self.receiver_gone {
            debug!("notification receiver dropped; notifications discarded");
            self.receiver_gone = true;
        }
    }

    /// Check if notifications are still being delivered
    pub fn has_receiver(&self) -> bool {
        !self.notifier.is_closed()
    }
}

/// Log a failed channel request; only unknown channels are warnings
fn channel_request_failed(channel: Channel, request: &str, error: &TransportError) {
    if error.is_channel_error() {
        warn!(%channel, request, error = %error, "channel request rejected");
    } else {
        debug!(%channel, request, error = %error, "channel request failed");
    }
}
