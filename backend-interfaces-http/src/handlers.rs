pub mod checkin_handlers;
pub mod courtesy_handlers;
pub mod ops_handlers;
pub mod purchase_handlers;
pub mod ticket_handlers;

pub use checkin_handlers::*;
pub use courtesy_handlers::*;
pub use ops_handlers::*;
pub use purchase_handlers::*;
pub use ticket_handlers::*;
