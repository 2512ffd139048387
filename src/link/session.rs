// Session Loop
// Drives a controller from radio events, application intents and its own timers

use super::controller::BeaconController;
use crate::codec::Cipher;
use crate::transport::{RadioTransport, TransportEvent};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Application request delivered to a running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartScan,
    StopScan,
    Connect,
    Disconnect,
    SendToken(String),
    SendConfirmation(String),
    ReplayLatest,
}

impl Intent {
    /// Apply the request to a controller
    pub fn apply<T: RadioTransport, C: Cipher>(self, controller: &mut BeaconController<T, C>) {
        match self {
            Intent::StartScan => controller.start_scan(),
            Intent::StopScan => controller.stop_scan(),
            Intent::Connect => controller.connect(),
            Intent::Disconnect => controller.disconnect(),
            Intent::SendToken(text) => controller.send_token(&text),
            Intent::SendConfirmation(text) => controller.send_confirmation(&text),
            Intent::ReplayLatest => controller.replay_latest(),
        }
    }
}

/// Run the controller until both input channels close.
///
/// Inputs are handled one at a time; timer expiries are interleaved with them
/// in deadline order. The controller is handed back when the session ends.
pub async fn run_session<T: RadioTransport, C: Cipher>(
    mut controller: BeaconController<T, C>,
    mut events: mpsc::Receiver<TransportEvent>,
    mut intents: mpsc::Receiver<Intent>,
) -> BeaconController<T, C> {
    let mut events_open = true;
    let mut intents_open = true;
    info!("beacon session started");

    while events_open || intents_open {
        let deadline = controller.next_deadline();
        let sleep = async {
            match deadline {
                Some(d) => tokio::time::sleep_until(d.at()).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            event = events.recv(), if events_open => match event {
                Some(event) => controller.handle_event(event),
                None => {
                    debug!("event channel closed");
                    events_open = false;
                }
            },
            intent = intents.recv(), if intents_open => match intent {
                Some(intent) => intent.apply(&mut controller),
                None => {
                    debug!("intent channel closed");
                    intents_open = false;
                }
            },
            _ = sleep => {
                if let Some(d) = deadline {
                    controller.on_deadline(d);
                }
            }
        }
    }

    info!(state = %controller.state(), "beacon session ended");
    controller
}
