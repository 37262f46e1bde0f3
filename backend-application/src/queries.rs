// Application queries (read-only operations)
pub mod ticket_queries;
