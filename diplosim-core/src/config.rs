use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyConfig {
    /// Follow defensive pacts of realms pulled into a war, not just the
    /// original victim's.
    pub chain_defensive_pacts: bool,

    /// Compute checksum every N turns (0 = disabled).
    ///
    /// Recommended values:
    /// - `1`: Every turn (replay validation)
    /// - `10`: Balanced
    pub checksum_frequency: u32,

    /// Emit an `effects_expired` event for every ledger that lost effects
    /// during decay. Noisy on long games.
    pub record_expirations: bool,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            chain_defensive_pacts: true,
            checksum_frequency: 10,
            record_expirations: true,
        }
    }
}
