pub mod auth;
pub mod dao;
pub mod eligibility;
pub mod lifecycle;
pub mod notify;

pub use auth::AuthService;
pub use dao::*;
pub use lifecycle::LifecycleService;
pub use notify::NotificationDispatcher;
