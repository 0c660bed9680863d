use bson::{doc, oid::ObjectId};
use chrono::NaiveDate;
use mongodb::Database;

use bloodlink_db::models::{BloodGroup, BloodRequest, DonorSnapshot, RequestStatus};

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct RequestDao {
    pub base: BaseDao<BloodRequest>,
}

impl RequestDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, BloodRequest::COLLECTION),
        }
    }

    pub async fn insert(&self, request: &BloodRequest) -> DaoResult<BloodRequest> {
        let id = self.base.insert_one(request).await?;
        self.base.find_by_id(id).await
    }

    /// Most recent request created by this user, for the 24h creation cooldown.
    pub async fn last_created_by(&self, user_id: ObjectId) -> DaoResult<Option<BloodRequest>> {
        Ok(self
            .base
            .collection()
            .find_one(doc! { "created_by": user_id })
            .sort(doc! { "created_at": -1 })
            .await?)
    }

    /// Whether the donor currently holds a request in `booked` status.
    pub async fn has_active_booking(&self, donor_id: ObjectId) -> DaoResult<bool> {
        let count = self
            .base
            .count(doc! {
                "donor.user_id": donor_id,
                "status": RequestStatus::Booked.as_str(),
            })
            .await?;
        Ok(count > 0)
    }

    /// Atomically claim a pending, unbooked request for `donor`. The guard on
    /// `donor: null` makes the loser of a concurrent booking race get `None`
    /// instead of silently overwriting the winner.
    pub async fn book(
        &self,
        request_id: ObjectId,
        donor: &DonorSnapshot,
    ) -> DaoResult<Option<BloodRequest>> {
        self.base
            .find_one_and_update(
                doc! {
                    "_id": request_id,
                    "status": RequestStatus::Pending.as_str(),
                    "donor": bson::Bson::Null,
                },
                doc! {
                    "$set": {
                        "status": RequestStatus::Booked.as_str(),
                        "donor": bson::to_bson(donor)?,
                    }
                },
            )
            .await
    }

    /// Transition booked -> completed; false if the request was not booked.
    pub async fn complete(&self, request_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! {
                    "_id": request_id,
                    "status": RequestStatus::Booked.as_str(),
                },
                doc! { "$set": { "status": RequestStatus::Completed.as_str() } },
            )
            .await
    }

    pub async fn find_pending(&self) -> DaoResult<Vec<BloodRequest>> {
        self.base
            .find_many(doc! { "status": RequestStatus::Pending.as_str() }, None)
            .await
    }

    /// Batch-expire the given requests; returns how many were updated.
    pub async fn expire(&self, ids: &[ObjectId]) -> DaoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .base
            .collection()
            .update_many(
                doc! {
                    "_id": { "$in": ids.to_vec() },
                    "status": RequestStatus::Pending.as_str(),
                },
                doc! { "$set": {
                    "status": RequestStatus::Expired.as_str(),
                    "updated_at": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Public listing: pending requests whose donation date has not passed,
    /// newest first, optionally filtered by city and blood group.
    pub async fn list_open(
        &self,
        today: NaiveDate,
        city: Option<&str>,
        blood_group: Option<BloodGroup>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<BloodRequest>> {
        let mut filter = doc! {
            "status": RequestStatus::Pending.as_str(),
            "donation_date": { "$gte": today.to_string() },
        };
        if let Some(city) = city {
            filter.insert("address.city", city.to_lowercase());
        }
        if let Some(group) = blood_group {
            filter.insert("blood_group", group.as_str());
        }

        self.base
            .find_paginated(filter, Some(doc! { "created_at": -1 }), params)
            .await
    }
}
