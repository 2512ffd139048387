// Simulated BLE Radio
// In-memory radio that records every request; used by tests and the CLI replay

use super::{RadioPower, RadioTransport, TransportError};
use crate::channel::Channel;
use crate::peer::PeerId;

/// A request issued to the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCommand {
    StartScan,
    StopScan,
    Connect(PeerId),
    Disconnect(PeerId),
    EnumerateChannels(PeerId),
    Subscribe(String),
    Write { channel_id: String, value: Vec<u8> },
    Read(String),
}

/// Simulated radio stack
#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    power: RadioPower,
    scanning: bool,
    link: Option<PeerId>,
    commands: Vec<RadioCommand>,
    fail_connect: Option<String>,
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRadio {
    /// Create a powered-on radio
    pub fn new() -> Self {
        Self {
            power: RadioPower::On,
            scanning: false,
            link: None,
            commands: Vec::new(),
            fail_connect: None,
        }
    }

    /// Make every connect request fail immediately
    pub fn with_connect_failure(mut self, reason: &str) -> Self {
        self.fail_connect = Some(reason.to_string());
        self
    }

    pub fn set_power(&mut self, power: RadioPower) {
        self.power = power;
        if power != RadioPower::On {
            self.scanning = false;
            self.link = None;
        }
    }

    /// Check if a scan is running
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Peer with an open or pending link
    pub fn linked_peer(&self) -> Option<&PeerId> {
        self.link.as_ref()
    }

    /// Every request issued so far
    pub fn commands(&self) -> &[RadioCommand] {
        &self.commands
    }

    /// Take and clear the recorded requests
    pub fn take_commands(&mut self) -> Vec<RadioCommand> {
        std::mem::take(&mut self.commands)
    }

    fn require_power(&self) -> Result<(), TransportError> {
        match self.power {
            RadioPower::On => Ok(()),
            _ => Err(TransportError::PoweredOff),
        }
    }

    fn require_link(&self) -> Result<(), TransportError> {
        self.require_power()?;
        self.link.as_ref().map(|_| ()).ok_or(TransportError::NotConnected)
    }

    fn require_channel(&self, channel_id: &str) -> Result<(), TransportError> {
        self.require_link()?;
        match Channel::from_uuid(channel_id) {
            Some(_) => Ok(()),
            None => Err(TransportError::UnknownChannel(channel_id.to_string())),
        }
    }
}

impl RadioTransport for SimulatedRadio {
    fn start_scan(&mut self) -> Result<(), TransportError> {
        self.require_power()?;
        self.scanning = true;
        self.commands.push(RadioCommand::StartScan);
        Ok(())
    }

    fn stop_scan(&mut self) -> Result<(), TransportError> {
        self.scanning = false;
        self.commands.push(RadioCommand::StopScan);
        Ok(())
    }

    fn connect(&mut self, identity: &PeerId) -> Result<(), TransportError> {
        self.require_power()?;
        self.commands.push(RadioCommand::Connect(identity.clone()));
        if let Some(reason) = &self.fail_connect {
            return Err(TransportError::ConnectionFailed(reason.clone()));
        }
        self.link = Some(identity.clone());
        Ok(())
    }

    fn disconnect(&mut self, identity: &PeerId) -> Result<(), TransportError> {
        self.commands.push(RadioCommand::Disconnect(identity.clone()));
        match &self.link {
            Some(linked) if linked == identity => {
                self.link = None;
                Ok(())
            }
            _ => Err(TransportError::UnknownPeer(identity.to_string())),
        }
    }

    fn enumerate_channels(&mut self, identity: &PeerId) -> Result<(), TransportError> {
        self.require_link()?;
        self.commands
            .push(RadioCommand::EnumerateChannels(identity.clone()));
        Ok(())
    }

    fn subscribe(&mut self, channel_id: &str) -> Result<(), TransportError> {
        self.require_channel(channel_id)?;
        self.commands
            .push(RadioCommand::Subscribe(channel_id.to_string()));
        Ok(())
    }

    fn write(&mut self, channel_id: &str, value: &[u8]) -> Result<(), TransportError> {
        self.require_channel(channel_id)?;
        self.commands.push(RadioCommand::Write {
            channel_id: channel_id.to_string(),
            value: value.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, channel_id: &str) -> Result<(), TransportError> {
        self.require_channel(channel_id)?;
        self.commands.push(RadioCommand::Read(channel_id.to_string()));
        Ok(())
    }
}
