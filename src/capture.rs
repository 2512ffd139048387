// Capture Files
// Recorded advertisements, one per line: identity<TAB>signal<TAB>advertisement
//
// Lines starting with '#' and blank lines are skipped. The advertisement
// column is kept verbatim (including trailing padding).

use crate::peer::PeerId;
use crate::transport::TransportEvent;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors reading or writing capture files
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One recorded advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAdvert {
    pub identity: PeerId,
    pub signal_strength: i16,
    pub advertisement: String,
}

impl CapturedAdvert {
    pub fn new(identity: &str, signal_strength: i16, advertisement: &str) -> Self {
        Self {
            identity: PeerId::new(identity),
            signal_strength,
            advertisement: advertisement.to_string(),
        }
    }

    /// Convert into the radio event it was recorded from
    pub fn into_event(self) -> TransportEvent {
        TransportEvent::PeerDiscovered {
            identity: self.identity,
            signal_strength: self.signal_strength,
            advertisement: self.advertisement,
        }
    }

    /// Render as a capture line (without newline)
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}",
            self.identity, self.signal_strength, self.advertisement
        )
    }
}

/// Parse capture text
pub fn parse_capture(text: &str) -> Result<Vec<CapturedAdvert>, CaptureError> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.splitn(3, '\t');
        let (Some(identity), Some(signal), Some(advertisement)) =
            (columns.next(), columns.next(), columns.next())
        else {
            return Err(CaptureError::Malformed {
                line: line_no,
                reason: "expected three tab-separated columns".to_string(),
            });
        };

        if identity.is_empty() {
            return Err(CaptureError::Malformed {
                line: line_no,
                reason: "empty identity".to_string(),
            });
        }
        let signal_strength =
            signal
                .trim()
                .parse::<i16>()
                .map_err(|e| CaptureError::Malformed {
                    line: line_no,
                    reason: format!("bad signal strength {:?}: {}", signal, e),
                })?;

        records.push(CapturedAdvert::new(identity, signal_strength, advertisement));
    }

    Ok(records)
}

/// Load a capture file
pub fn load_capture(path: &Path) -> Result<Vec<CapturedAdvert>, CaptureError> {
    let text = fs::read_to_string(path)?;
    parse_capture(&text)
}

/// Write records as a capture file
pub fn write_capture(path: &Path, records: &[CapturedAdvert]) -> Result<(), CaptureError> {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.to_line());
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}
