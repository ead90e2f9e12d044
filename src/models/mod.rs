pub mod trade;
pub mod user;

pub use trade::Trade;
pub use user::User;
