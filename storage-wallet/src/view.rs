use serde::Serialize;

use crate::network::NetworkRegistry;
use crate::state::{ConnectionState, ConnectionStatus};
use crate::units::shorten_address;

/// Display-ready projection of [`ConnectionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub status_label: String,
    pub account: Option<String>,
    pub network_label: Option<String>,
    pub balance_label: String,
    pub show_switch_network: bool,
    pub can_submit: bool,
    pub pending_tx: Option<String>,
    pub value: Option<String>,
}

impl ConnectionView {
    pub fn new(state: &ConnectionState, networks: &NetworkRegistry) -> Self {
        let status = state.status();
        let status_label = match status {
            ConnectionStatus::Connected { .. } => "Connected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Disconnected => "Not Connected",
        }
        .to_string();

        let network = state.chain_id.as_deref().and_then(|id| networks.lookup(id));
        let network_label = state.chain_id.as_ref().map(|_| match network {
            Some(n) if n.is_supported => n.name.clone(),
            _ => "Wrong Network".to_string(),
        });

        let balance_label = match (&state.balance, network) {
            (Some(balance), Some(n)) => format!("{balance} {}", n.native_symbol),
            (Some(balance), None) => balance.clone(),
            (None, _) => "-".to_string(),
        };

        let network_invalid = matches!(
            status,
            ConnectionStatus::Connected {
                network_valid: false
            }
        );

        Self {
            status_label,
            account: state.address.as_deref().map(shorten_address),
            network_label,
            balance_label,
            show_switch_network: network_invalid,
            can_submit: state.connected
                && state.network_valid
                && state.pending_tx.is_none()
                && !state.draft.trim().is_empty(),
            pending_tx: state.pending_tx.clone(),
            value: state.value.clone(),
        }
    }
}
