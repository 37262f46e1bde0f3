pub mod clock;
pub mod http_identity;
pub mod notifications;
pub mod paypal;

pub use clock::*;
pub use http_identity::*;
pub use notifications::*;
pub use paypal::*;
