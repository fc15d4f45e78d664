pub mod tickets;
pub mod users;

pub use tickets::{handle_create_ticket, handle_list_tickets};
pub use users::handle_list_users;
