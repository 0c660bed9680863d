pub mod base;
pub mod notification;
pub mod request;
pub mod user;

pub use base::BaseDao;
