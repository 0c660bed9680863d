use mongodb::{Database, IndexModel};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Blood requests
    create_indexes(
        db,
        "blood_requests",
        vec![
            // Latest request per creator (24h creation cooldown lookup)
            index(bson::doc! { "created_by": 1, "created_at": -1 }),
            // Open-request listing and the expiry sweep
            index(bson::doc! { "status": 1, "donation_date": 1 }),
            index(bson::doc! { "status": 1, "address.city": 1, "blood_group": 1, "created_at": -1 }),
            // Active-booking-per-donor check
            index(bson::doc! { "donor.user_id": 1, "status": 1 }),
        ],
    )
    .await?;

    // Users
    create_indexes(
        db,
        "users",
        vec![
            index(bson::doc! { "is_donor": 1, "approval": 1, "blood_group": 1 }),
            index(bson::doc! { "is_donor": 1, "approval": 1, "address.city": 1 }),
        ],
    )
    .await?;

    // Notifications
    create_indexes(
        db,
        "notifications",
        vec![
            index(bson::doc! { "created_at": -1 }),
            index(bson::doc! { "request_id": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
