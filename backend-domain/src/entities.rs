// Domain entities
pub mod event;
pub mod model;
pub mod ticket;
pub mod ticket_log;
pub mod ticket_type;

pub use event::*;
pub use model::*;
pub use ticket::*;
pub use ticket_log::*;
pub use ticket_type::*;
