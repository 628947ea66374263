//! Client-side wallet connection for the SimpleStorage dApp.
//!
//! [`ConnectionController`] owns the connection state and reconciles
//! provider events with user intents. Providers plug in through
//! [`WalletProvider`]; [`LocalKeyProvider`] is a headless implementation.

pub mod controller;
pub mod error;
pub mod local;
pub mod network;
pub mod notice;
pub mod provider;
pub mod state;
pub mod units;
pub mod view;

pub use controller::{ConnectionController, ControllerConfig, NetworkStatus};
pub use error::{ProviderError, WalletError};
pub use local::LocalKeyProvider;
pub use network::{NetworkDescriptor, NetworkRegistry};
pub use notice::{Notice, NoticeKind, Notifier};
pub use provider::{BlockTag, ContractCall, ProviderEvent, TxReceipt, WalletProvider};
pub use state::{ConnectionState, ConnectionStatus};
pub use view::ConnectionView;
