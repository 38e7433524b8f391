//! Peer settings as the stream actor sees them.
//!
//! spec §2: "current peer settings (notably `max_frame_size`)", exposed as
//! a read-only snapshot (spec §5: "Peer settings are read-only snapshots
//! from the stream's perspective"). The connection-level SETTINGS exchange
//! itself — negotiating these values with the peer — is out of scope
//! (spec §1); this module only carries the resulting snapshot.

/// RFC 7540 §6.5.2 default `SETTINGS_MAX_FRAME_SIZE`.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// A snapshot of the settings the stream actor needs.
///
/// Only `max_frame_size` is modeled; the rest of SETTINGS (initial window
/// size, header table size, ...) belongs to connection-level flow control
/// and HPACK table sizing, both out of scope here (spec §1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerSettings {
    pub max_frame_size: u32,
}

impl Default for PeerSettings {
    fn default() -> Self {
        PeerSettings {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
