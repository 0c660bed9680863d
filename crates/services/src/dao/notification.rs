use bson::{doc, oid::ObjectId};
use mongodb::Database;

use bloodlink_db::models::{Notification, NotificationType};

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        notification_type: NotificationType,
        request_id: ObjectId,
        title: String,
        body: String,
    ) -> DaoResult<ObjectId> {
        let notification = Notification {
            id: None,
            notification_type,
            request_id,
            title,
            body,
            is_read: false,
            created_at: bson::DateTime::now(),
        };
        self.base.insert_one(&notification).await
    }

    pub async fn list(&self, params: &PaginationParams) -> DaoResult<PaginatedResult<Notification>> {
        self.base
            .find_paginated(doc! {}, Some(doc! { "created_at": -1 }), params)
            .await
    }

    pub async fn mark_read(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "is_read": true } })
            .await
    }
}
