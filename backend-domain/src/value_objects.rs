// Domain value objects
pub mod access_type;
pub mod identity;
pub mod roles;
pub mod ticket_status;

pub use access_type::*;
pub use identity::*;
pub use roles::*;
pub use ticket_status::*;
