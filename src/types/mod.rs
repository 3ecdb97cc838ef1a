//! Shared primitive types.

mod message;
pub use message::*;

mod multisend;
pub use multisend::*;

mod operation;
pub use operation::*;

mod safe_tx;
pub use safe_tx::*;

mod session;
pub use session::*;

mod signature;
pub use signature::*;

mod webauthn;
pub use webauthn::*;
