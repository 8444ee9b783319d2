//! Browser extension choreography: background dispatcher, content script,
//! and the overlay it renders.

pub mod content;
pub mod dispatcher;
pub mod messaging;
pub mod overlay;
pub mod tabs;

pub use content::{ActivationOutcome, OverlaySession, TabContext, TabId};
pub use dispatcher::{BackgroundDispatcher, DispatchTable, Scripting};
pub use messaging::{Action, ExtensionMessage, MessageReply, MessageSender};
pub use tabs::TabRegistry;
