// Beacon Controller Tests
// Lifecycle, trust gating and channel handling driven through the simulated radio

use cryptobeacon::broadcast::Status;
use cryptobeacon::channel::Channel;
use cryptobeacon::codec::{render_advertisement, PassthroughCipher};
use cryptobeacon::config::FRAME_LEN;
use cryptobeacon::notify::{drain, NotificationReceiver};
use cryptobeacon::peer::PeerId;
use cryptobeacon::transport::{RadioCommand, RadioPower, SimulatedRadio, TransportEvent};
use cryptobeacon::{AdvertFormat, BeaconConfig, BeaconController, LinkState, Notification};

type Controller = BeaconController<SimulatedRadio, PassthroughCipher>;

const PEER: &str = "beacon-1";

/// Status 3, icon3, secondary value 5, simple text "HELLO"
fn hello_frame() -> [u8; FRAME_LEN] {
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = 0x32;
    bytes[5] = 0x05;
    bytes[7..12].copy_from_slice(b"HELLO");
    bytes
}

fn extras_frame(label: &[u8], amount: u16) -> [u8; FRAME_LEN] {
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = 0x30;
    bytes[6] = 0xBF;
    bytes[7..9].copy_from_slice(&amount.to_be_bytes());
    bytes[9..9 + label.len()].copy_from_slice(label);
    bytes
}

fn advert(peer: &str, rssi: i16, frame: [u8; FRAME_LEN]) -> TransportEvent {
    TransportEvent::PeerDiscovered {
        identity: PeerId::new(peer),
        signal_strength: rssi,
        advertisement: render_advertisement(&frame, &AdvertFormat::default()),
    }
}

fn scanning() -> (Controller, NotificationReceiver) {
    let (mut controller, rx) =
        BeaconController::new(SimulatedRadio::new(), PassthroughCipher, BeaconConfig::default());
    controller.start_scan();
    (controller, rx)
}

/// Feed enough advertisements for the peer to become trusted
fn trusted() -> (Controller, NotificationReceiver) {
    let (mut controller, mut rx) = scanning();
    for _ in 0..22 {
        controller.handle_event(advert(PEER, -50, hello_frame()));
    }
    assert!(controller.active_peer().unwrap().is_trusted());
    drain(&mut rx);
    (controller, rx)
}

fn connected() -> (Controller, NotificationReceiver) {
    let (mut controller, mut rx) = trusted();
    controller.connect();
    controller.handle_event(TransportEvent::LinkEstablished {
        identity: PeerId::new(PEER),
    });
    for channel in Channel::ALL {
        controller.handle_event(TransportEvent::ChannelDiscovered {
            channel_id: channel.uuid().to_string(),
        });
    }
    assert_eq!(drain(&mut rx), vec![Notification::Connected]);
    controller.transport_mut().take_commands();
    (controller, rx)
}

// ============================================================================
// SCANNING
// ============================================================================

#[test]
fn test_start_scan_from_idle() {
    let (controller, _rx) = scanning();

    assert_eq!(controller.state(), LinkState::Scanning);
    assert!(controller.transport().is_scanning());
    assert_eq!(controller.transport().commands(), &[RadioCommand::StartScan]);
}

#[test]
fn test_stop_scan_returns_to_idle() {
    let (mut controller, _rx) = scanning();

    controller.stop_scan();

    assert_eq!(controller.state(), LinkState::Idle);
    assert!(controller.next_deadline().is_none());
}

#[test]
fn test_advertisement_ignored_when_idle() {
    let (mut controller, mut rx) =
        BeaconController::new(SimulatedRadio::new(), PassthroughCipher, BeaconConfig::default());

    controller.handle_event(advert(PEER, -50, hello_frame()));

    assert!(controller.active_peer().is_none());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_power_changes_are_notified() {
    let (mut controller, mut rx) = scanning();

    controller.handle_event(TransportEvent::PowerChanged(RadioPower::Off));
    controller.handle_event(TransportEvent::PowerChanged(RadioPower::Unauthorized));
    controller.handle_event(TransportEvent::PowerChanged(RadioPower::On));

    assert_eq!(
        drain(&mut rx),
        vec![Notification::PowerOff, Notification::PowerOn]
    );
    assert_eq!(controller.power(), Some(RadioPower::On));
}

// ============================================================================
// ADVERTISEMENT PIPELINE
// ============================================================================

#[test]
fn test_foreign_advertisement_changes_nothing() {
    let (mut controller, mut rx) = scanning();

    controller.handle_event(TransportEvent::PeerDiscovered {
        identity: PeerId::new("speaker"),
        signal_strength: -30,
        advertisement: "<0770> short".to_string(),
    });

    assert!(controller.active_peer().is_none());
    assert!(controller.next_deadline().is_none());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_positive_signal_is_dropped() {
    let (mut controller, _rx) = scanning();

    controller.handle_event(advert(PEER, 3, hello_frame()));

    assert!(controller.active_peer().is_none());
}

#[test]
fn test_untrusted_peer_surfaces_nothing() {
    let (mut controller, mut rx) = scanning();

    for _ in 0..21 {
        controller.handle_event(advert(PEER, -50, hello_frame()));
    }

    assert!(drain(&mut rx).is_empty());
    assert!(controller.snapshot().is_empty());
    assert_eq!(controller.active_peer().unwrap().message_count(), 20);
}

#[test]
fn test_crossing_threshold_surfaces_fields() {
    let (mut controller, mut rx) = scanning();
    for _ in 0..21 {
        controller.handle_event(advert(PEER, -50, hello_frame()));
    }

    controller.handle_event(advert(PEER, -50, hello_frame()));

    assert_eq!(
        drain(&mut rx),
        vec![
            Notification::Status(Status::from_code(3).unwrap()),
            Notification::Icon("icon3.png".to_string()),
            Notification::Value2(5),
            Notification::Text("HELLO".to_string()),
        ]
    );
    assert_eq!(controller.snapshot().text.as_deref(), Some("HELLO"));
    assert_eq!(controller.snapshot().primary_value, None);
}

/// Status 3, icon3, primary 0x000102, secondary 0, identifier payload
fn identifier_frame(kind: u8, id: &[u8]) -> [u8; FRAME_LEN] {
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = 0x32;
    bytes[1..4].copy_from_slice(&[0x00, 0x01, 0x02]);
    bytes[6] = kind;
    bytes[7..7 + id.len()].copy_from_slice(id);
    bytes
}

#[test]
fn test_zero_secondary_value_still_surfaces() {
    let (mut controller, mut rx) = trusted();

    controller.handle_event(advert(PEER, -50, identifier_frame(0x20, b"ID1")));

    assert_eq!(
        drain(&mut rx),
        vec![
            Notification::Status(Status::from_code(3).unwrap()),
            Notification::Icon("icon3.png".to_string()),
            Notification::Value1(258),
            Notification::Value2(0),
            Notification::Identifier1("ID1".to_string()),
        ]
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.primary_value, Some(258));
    assert_eq!(snapshot.secondary_value, Some(0));
    assert_eq!(snapshot.identifier_1.as_deref(), Some("ID1"));
}

#[test]
fn test_second_identifier_routes_to_snapshot() {
    let (mut controller, mut rx) = trusted();

    controller.handle_event(advert(PEER, -50, identifier_frame(0x21, b"ID2")));

    let surfaced = drain(&mut rx);
    assert_eq!(
        surfaced.last(),
        Some(&Notification::Identifier2("ID2".to_string()))
    );
    assert!(!surfaced
        .iter()
        .any(|n| matches!(n, Notification::Identifier1(_))));
    assert_eq!(controller.snapshot().identifier_2.as_deref(), Some("ID2"));
    assert_eq!(controller.snapshot().identifier_1, None);
}

#[test]
fn test_dropped_receiver_does_not_stop_controller() {
    let (mut controller, rx) = scanning();
    drop(rx);
    assert!(!controller.has_receiver());

    for _ in 0..22 {
        controller.handle_event(advert(PEER, -50, hello_frame()));
    }

    assert!(controller.active_peer().unwrap().is_trusted());
    assert_eq!(controller.snapshot().text.as_deref(), Some("HELLO"));
    assert_eq!(controller.state(), LinkState::Scanning);
}

#[test]
fn test_reset_status_clears_untrusted_peer() {
    let (mut controller, mut rx) = scanning();
    controller.handle_event(advert(PEER, -50, hello_frame()));

    let mut reset = hello_frame();
    reset[0] = 0x62;
    controller.handle_event(advert(PEER, -50, reset));

    assert!(controller.active_peer().is_none());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::Status(Status::from_code(6).unwrap())]
    );
}

#[test]
fn test_weaker_broadcaster_does_not_displace_or_surface() {
    let (mut controller, mut rx) = trusted();

    let mut other = hello_frame();
    other[7..12].copy_from_slice(b"OTHER");
    controller.handle_event(advert("beacon-2", -90, other));

    assert_eq!(controller.active_peer().unwrap().identity().as_str(), PEER);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_stronger_broadcaster_restarts_trust() {
    let (mut controller, mut rx) = trusted();

    controller.handle_event(advert("beacon-2", -20, hello_frame()));

    let peer = controller.active_peer().unwrap();
    assert_eq!(peer.identity().as_str(), "beacon-2");
    assert!(!peer.is_trusted());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_ledger_tracks_untrusted_extras() {
    let (mut controller, mut rx) = scanning();

    controller.handle_event(advert(PEER, -50, extras_frame(b"TIP", 250)));

    assert_eq!(controller.ledger().get("TIP"), Some("2.50"));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_trusted_extras_notify_whole_ledger() {
    let (mut controller, mut rx) = trusted();

    controller.handle_event(advert(PEER, -50, extras_frame(b"TIP", 250)));
    controller.handle_event(advert(PEER, -50, extras_frame(b"FEE", 100)));
    drain(&mut rx);
    controller.handle_event(advert(PEER, -50, extras_frame(b"TIP", 0)));

    let extras: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|n| match n {
            Notification::Extras(map) => Some(map),
            _ => None,
        })
        .collect();
    assert_eq!(extras.len(), 1);
    assert_eq!(extras[0].len(), 1);
    assert_eq!(extras[0].get("FEE").map(String::as_str), Some("1.00"));
}

#[test]
fn test_replay_latest_reemits_snapshot() {
    let (mut controller, mut rx) = trusted();
    controller.handle_event(advert(PEER, -50, hello_frame()));
    let surfaced = drain(&mut rx);

    controller.replay_latest();

    let replayed = drain(&mut rx);
    assert_eq!(replayed.len(), surfaced.len());
    for notification in surfaced {
        assert!(replayed.contains(&notification));
    }
}

// ============================================================================
// CONNECTING
// ============================================================================

#[test]
fn test_connect_requires_active_peer() {
    let (mut controller, _rx) = scanning();

    controller.connect();

    assert_eq!(controller.state(), LinkState::Scanning);
}

#[test]
fn test_connect_sequence_reaches_connected() {
    let (mut controller, mut rx) = trusted();
    controller.transport_mut().take_commands();
    let peer = PeerId::new(PEER);

    controller.connect();
    assert_eq!(controller.state(), LinkState::Connecting);

    controller.handle_event(TransportEvent::LinkEstablished {
        identity: peer.clone(),
    });
    assert_eq!(controller.state(), LinkState::DiscoveringChannels);

    for channel in Channel::ALL {
        controller.handle_event(TransportEvent::ChannelDiscovered {
            channel_id: channel.uuid().to_string(),
        });
    }

    assert!(controller.is_connected());
    assert!(controller.snapshot().is_empty());
    assert!(controller.next_deadline().is_none());
    assert_eq!(drain(&mut rx), vec![Notification::Connected]);

    let commands = controller.transport().commands();
    assert_eq!(commands[0], RadioCommand::Connect(peer.clone()));
    assert_eq!(commands[1], RadioCommand::EnumerateChannels(peer));
    assert!(commands.contains(&RadioCommand::Subscribe(Channel::Value.uuid().to_string())));
    assert!(commands.contains(&RadioCommand::Subscribe(Channel::Text.uuid().to_string())));
    assert!(commands.contains(&RadioCommand::StopScan));
}

#[test]
fn test_unrelated_and_duplicate_channels() {
    let (mut controller, mut rx) = trusted();
    controller.connect();
    controller.handle_event(TransportEvent::LinkEstablished {
        identity: PeerId::new(PEER),
    });

    controller.handle_event(TransportEvent::ChannelDiscovered {
        channel_id: "0000180F-0000-1000-8000-00805F9B34FB".to_string(),
    });
    for _ in 0..3 {
        controller.handle_event(TransportEvent::ChannelDiscovered {
            channel_id: Channel::Value.uuid().to_string(),
        });
    }

    assert_eq!(controller.channels().len(), 1);
    assert_eq!(controller.state(), LinkState::DiscoveringChannels);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_link_failure_notifies_connect_failed() {
    let (mut controller, mut rx) = trusted();
    controller.connect();

    controller.handle_event(TransportEvent::LinkFailed {
        identity: PeerId::new(PEER),
        error: Some("peer busy".to_string()),
    });

    assert_eq!(controller.state(), LinkState::Disconnected);
    assert_eq!(drain(&mut rx), vec![Notification::ConnectFailed]);
    assert!(controller.next_deadline().is_none());
}

#[test]
fn test_transport_refusing_connect() {
    let (mut controller, mut rx) = BeaconController::new(
        SimulatedRadio::new().with_connect_failure("radio busy"),
        PassthroughCipher,
        BeaconConfig::default().with_stability_threshold(0),
    );
    controller.start_scan();
    controller.handle_event(advert(PEER, -50, hello_frame()));

    controller.connect();

    assert_eq!(controller.state(), LinkState::Disconnected);
    assert!(drain(&mut rx).contains(&Notification::ConnectFailed));
}

#[test]
fn test_drop_during_discovery_is_connect_failure() {
    let (mut controller, mut rx) = trusted();
    controller.connect();
    controller.handle_event(TransportEvent::LinkEstablished {
        identity: PeerId::new(PEER),
    });

    controller.handle_event(TransportEvent::LinkDropped {
        identity: PeerId::new(PEER),
        error: None,
    });

    assert_eq!(controller.state(), LinkState::Disconnected);
    assert_eq!(drain(&mut rx), vec![Notification::ConnectFailed]);
}

#[test]
fn test_link_events_for_other_peer_are_stale() {
    let (mut controller, mut rx) = trusted();
    controller.connect();

    controller.handle_event(TransportEvent::LinkEstablished {
        identity: PeerId::new("beacon-9"),
    });
    controller.handle_event(TransportEvent::LinkFailed {
        identity: PeerId::new("beacon-9"),
        error: None,
    });

    assert_eq!(controller.state(), LinkState::Connecting);
    assert!(drain(&mut rx).is_empty());
}

// ============================================================================
// CONNECTED
// ============================================================================

#[test]
fn test_value_and_text_updates() {
    let (mut controller, mut rx) = connected();

    controller.handle_event(TransportEvent::ChannelValueUpdated {
        channel_id: Channel::Value.uuid().to_string(),
        value: vec![0x10, 0x27],
        error: None,
    });
    controller.handle_event(TransportEvent::ChannelValueUpdated {
        channel_id: Channel::Value.uuid().to_string(),
        value: vec![0, 0],
        error: None,
    });
    controller.handle_event(TransportEvent::ChannelValueUpdated {
        channel_id: Channel::Text.uuid().to_string(),
        value: b"Paid".to_vec(),
        error: None,
    });
    controller.handle_event(TransportEvent::ChannelValueUpdated {
        channel_id: Channel::Text.uuid().to_string(),
        value: b"ignored".to_vec(),
        error: Some("read failed".to_string()),
    });

    assert_eq!(
        drain(&mut rx),
        vec![
            Notification::Value3(10000),
            Notification::Text2("Paid".to_string()),
        ]
    );
}

#[test]
fn test_notify_enabled_triggers_read() {
    let (mut controller, _rx) = connected();

    controller.handle_event(TransportEvent::NotificationStateChanged {
        channel_id: Channel::Value.uuid().to_string(),
        enabled: true,
        error: None,
    });
    controller.handle_event(TransportEvent::NotificationStateChanged {
        channel_id: Channel::Text.uuid().to_string(),
        enabled: false,
        error: None,
    });

    assert_eq!(
        controller.transport().commands(),
        &[RadioCommand::Read(Channel::Value.uuid().to_string())]
    );
}

#[test]
fn test_send_token_writes_and_reads_back() {
    let (mut controller, mut rx) = connected();

    controller.send_token("TOKEN-7");
    controller.handle_event(TransportEvent::WriteAcknowledged {
        channel_id: Channel::Token.uuid().to_string(),
        error: None,
    });
    controller.handle_event(TransportEvent::ChannelValueUpdated {
        channel_id: Channel::Token.uuid().to_string(),
        value: b"TOKEN-7".to_vec(),
        error: None,
    });

    assert_eq!(
        controller.transport().commands(),
        &[
            RadioCommand::Write {
                channel_id: Channel::Token.uuid().to_string(),
                value: b"TOKEN-7".to_vec(),
            },
            RadioCommand::Read(Channel::Token.uuid().to_string()),
        ]
    );
    assert_eq!(
        drain(&mut rx),
        vec![Notification::ConfirmationReceived("TOKEN-7".to_string())]
    );
}

#[test]
fn test_failed_write_is_not_read_back() {
    let (mut controller, _rx) = connected();

    controller.send_confirmation("OK");
    controller.handle_event(TransportEvent::WriteAcknowledged {
        channel_id: Channel::Confirmation.uuid().to_string(),
        error: Some("rejected".to_string()),
    });

    assert_eq!(controller.transport().commands().len(), 1);
}

#[test]
fn test_send_before_discovery_is_ignored() {
    let (mut controller, _rx) = trusted();
    controller.transport_mut().take_commands();

    controller.send_token("TOKEN-7");

    assert!(controller.transport().commands().is_empty());
}

#[test]
fn test_remote_drop_notifies_disconnected() {
    let (mut controller, mut rx) = connected();

    controller.handle_event(TransportEvent::LinkDropped {
        identity: PeerId::new(PEER),
        error: Some("supervision timeout".to_string()),
    });

    assert_eq!(controller.state(), LinkState::Disconnected);
    assert!(controller.active_peer().is_none());
    assert_eq!(drain(&mut rx), vec![Notification::Disconnected]);
}

#[test]
fn test_local_disconnect_notifies_once() {
    let (mut controller, mut rx) = connected();

    controller.disconnect();
    controller.handle_event(TransportEvent::LinkDropped {
        identity: PeerId::new(PEER),
        error: None,
    });

    assert_eq!(controller.state(), LinkState::Disconnected);
    assert_eq!(drain(&mut rx), vec![Notification::Disconnected]);
    assert!(controller
        .transport()
        .commands()
        .contains(&RadioCommand::Disconnect(PeerId::new(PEER))));
}

#[test]
fn test_late_channel_discovery_is_discarded() {
    let (mut controller, mut rx) = connected();
    controller.disconnect();
    drain(&mut rx);

    controller.handle_event(TransportEvent::ChannelDiscovered {
        channel_id: Channel::Value.uuid().to_string(),
    });

    assert!(controller.channels().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_rescan_after_disconnect() {
    let (mut controller, _rx) = connected();
    controller.disconnect();

    controller.start_scan();

    assert_eq!(controller.state(), LinkState::Scanning);
}
