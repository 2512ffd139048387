// Broadcast module - WHAT THE BEACON SAYS
// Frame parsing, the extras ledger and the last-known-good snapshot

mod ledger;
mod model;
mod parser;
mod snapshot;

pub use ledger::{ExtrasLedger, LedgerChange};
pub use model::{
    format_amount, Broadcast, DecodedBroadcast, ExtrasRecord, PayloadKind, PayloadText, Status,
    ICON_CATALOG, MAX_STATUS,
};
pub use parser::{trim_field, BroadcastParser};
pub use snapshot::LatestSnapshot;
