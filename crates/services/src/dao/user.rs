use bson::{doc, oid::ObjectId};
use chrono::NaiveDate;
use mongodb::Database;
use mongodb::options::UpdateOptions;

use bloodlink_db::models::{Address, Approval, BloodGroup, UserProfile};

use super::base::{BaseDao, DaoError, DaoResult};

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub contact: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<BloodGroup>,
    pub address: Option<Address>,
    pub is_donor: Option<bool>,
    pub last_donation_date: Option<NaiveDate>,
}

pub struct UserDao {
    pub base: BaseDao<UserProfile>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, UserProfile::COLLECTION),
        }
    }

    pub async fn find_by_id(&self, user_id: ObjectId) -> DaoResult<UserProfile> {
        self.base.find_by_id(user_id).await
    }

    /// Create-or-merge the profile document keyed on the identity provider's
    /// user id. Unsupplied fields keep their stored values.
    pub async fn upsert_profile(
        &self,
        user_id: ObjectId,
        update: ProfileUpdate,
    ) -> DaoResult<UserProfile> {
        let now = bson::DateTime::now();

        let mut set = doc! { "name": update.name, "updated_at": now };
        if let Some(contact) = update.contact {
            set.insert("contact", contact);
        }
        if let Some(dob) = update.date_of_birth {
            set.insert("date_of_birth", dob.to_string());
        }
        if let Some(group) = update.blood_group {
            set.insert("blood_group", group.as_str());
        }
        if let Some(address) = update.address {
            set.insert("address", bson::to_bson(&address)?);
        }
        if let Some(is_donor) = update.is_donor {
            set.insert("is_donor", is_donor);
        }
        if let Some(last) = update.last_donation_date {
            set.insert("last_donation_date", last.to_string());
        }

        let opts = UpdateOptions::builder().upsert(true).build();
        self.base
            .collection()
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$set": set,
                    "$setOnInsert": {
                        "created_at": now,
                        "approval": bson::to_bson(&Approval::Pending)?,
                    },
                },
            )
            .with_options(opts)
            .await?;

        self.base.find_by_id(user_id).await
    }

    pub async fn set_device_token(&self, user_id: ObjectId, token: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "device_token": token } })
            .await
    }

    /// Drop a stale push token reported by the provider.
    pub async fn clear_device_token(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$unset": { "device_token": "" } })
            .await
    }

    pub async fn add_booking(&self, user_id: ObjectId, request_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$push": { "bookings": request_id } })
            .await
    }

    /// Exactly-once per completed donation.
    pub async fn increment_donated(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$inc": { "donated_count": 1 } })
            .await
    }

    /// Approved donors, optionally filtered by blood group and city.
    pub async fn find_donors(
        &self,
        blood_group: Option<BloodGroup>,
        city: Option<&str>,
    ) -> DaoResult<Vec<UserProfile>> {
        let mut filter = doc! {
            "is_donor": true,
            "approval": bson::to_bson(&Approval::Approved)?,
        };
        if let Some(group) = blood_group {
            filter.insert("blood_group", group.as_str());
        }
        if let Some(city) = city {
            filter.insert("address.city", city.to_lowercase());
        }
        self.base.find_many(filter, Some(doc! { "name": 1 })).await
    }
}

impl UserDao {
    /// Convenience for callers that need a clearer "who" in the error.
    pub async fn try_find(&self, user_id: ObjectId) -> DaoResult<Option<UserProfile>> {
        match self.base.find_by_id(user_id).await {
            Ok(profile) => Ok(Some(profile)),
            Err(DaoError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
