use std::sync::Arc;

use mongodb::Database;

use bloodlink_config::Settings;
use bloodlink_services::{
    AuthService, LifecycleService, NotificationDispatcher,
    dao::{notification::NotificationDao, request::RequestDao, user::UserDao},
    notify,
};

/// Shared handles for every route handler. External collaborators (store,
/// push provider, token verifier) are injected here rather than living as
/// ambient singletons, so tests can substitute them.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub requests: Arc<RequestDao>,
    pub notifications: Arc<NotificationDao>,
    pub lifecycle: Arc<LifecycleService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.auth.clone()));
        let users = Arc::new(UserDao::new(&db));
        let requests = Arc::new(RequestDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));

        let push = notify::sender_from_settings(&settings.push);
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notifications.clone(),
            users.clone(),
            push,
        ));
        let lifecycle = Arc::new(LifecycleService::new(
            requests.clone(),
            users.clone(),
            dispatcher,
        ));

        Self {
            db,
            settings,
            auth,
            users,
            requests,
            notifications,
            lifecycle,
        }
    }
}
