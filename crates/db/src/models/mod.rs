mod notification;
mod request;
mod user;

pub use notification::{Notification, NotificationType};
pub use request::{Address, BloodGroup, BloodRequest, DonorSnapshot, RequestStatus};
pub use user::{Approval, UserProfile};
