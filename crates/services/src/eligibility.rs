//! Pure eligibility rules gating the request lifecycle: donation and
//! request-creation cooldowns, the expiry instant of a pending request, and
//! the profile-completeness gate. No IO; callers inject `now`.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use bloodlink_db::models::UserProfile;

pub const DONATION_COOLDOWN_DAYS: i64 = 90;
pub const CREATION_COOLDOWN_HOURS: i64 = 24;
pub const MIN_DONOR_AGE_YEARS: u32 = 18;

/// Outcome of the 90-day donor cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    Ready,
    Waiting { remaining_days: i64 },
}

/// A donor with no prior donation is eligible; otherwise at least 90 whole
/// days must have elapsed since the last donation date (taken at midnight
/// UTC). The shortfall is reported in whole days, rounded up.
pub fn donation_cooldown(last_donation: Option<NaiveDate>, now: DateTime<Utc>) -> Cooldown {
    let Some(last) = last_donation else {
        return Cooldown::Ready;
    };

    let last_instant = last
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let elapsed = now - last_instant;
    let window = Duration::days(DONATION_COOLDOWN_DAYS);

    if elapsed >= window {
        Cooldown::Ready
    } else {
        Cooldown::Waiting {
            remaining_days: ceil_div((window - elapsed).num_seconds(), 86_400),
        }
    }
}

/// 24h limit between requests by the same creator. Returns the remaining
/// wait in whole hours (rounded up), or `None` when creation is allowed.
pub fn creation_cooldown(
    last_created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let last = last_created_at?;
    let elapsed = now - last;
    let window = Duration::hours(CREATION_COOLDOWN_HOURS);

    if elapsed >= window {
        None
    } else {
        Some(ceil_div((window - elapsed).num_seconds(), 3_600))
    }
}

/// A pending request expires at the start of the calendar day following its
/// donation date.
pub fn expiry_instant(donation_date: NaiveDate) -> DateTime<Utc> {
    (donation_date + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Profile gate for creating or booking a request: name, adult date of
/// birth, usable contact, blood group and a full address.
pub fn profile_complete(profile: &UserProfile, today: NaiveDate) -> bool {
    let name_ok = profile.name.trim().len() >= 2;
    let contact_ok = profile
        .contact
        .as_ref()
        .is_some_and(|c| c.trim().len() >= 8);
    let adult = profile
        .date_of_birth
        .and_then(|dob| today.years_since(dob))
        .is_some_and(|age| age >= MIN_DONOR_AGE_YEARS);
    let address_ok = profile.address.as_ref().is_some_and(|a| {
        !a.line1.trim().is_empty() && !a.city.trim().is_empty() && !a.state.trim().is_empty()
    });

    name_ok && contact_ok && adult && profile.blood_group.is_some() && address_ok
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}
