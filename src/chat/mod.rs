mod controller;
mod relay;
pub use controller::{ChatController, SEND_FAILURE_TEXT, SendOutcome};
pub use relay::RelayClient;
