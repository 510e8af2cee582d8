use rand::Rng;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::repo::User;
use crate::config::PreparednessConfig;
use crate::error::{is_unique_violation, ApiError};
use crate::households::preparedness::{compute_status, Occupancy, PreparednessStatus};
use crate::households::repo::{
    self, Household, InventoryItem, MemberRecord, Membership,
};

const CODE_LEN: usize = 8;
const CODE_ATTEMPTS: usize = 5;

// No 0/O/1/I, so codes survive being read aloud or written down.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub(crate) fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub struct NewHousehold {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub extra_adults: i32,
    pub extra_children: i32,
    pub extra_pets: i32,
}

/// Creates a household and makes the creator its admin member, atomically.
pub async fn create_household(
    db: &PgPool,
    creator_id: i64,
    new: NewHousehold,
) -> Result<Household, ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::Validation("household name is required".into()));
    }

    let mut tx = db.begin().await?;
    let household = Household::insert(
        &mut *tx,
        new.name.trim(),
        new.latitude,
        new.longitude,
        new.extra_adults,
        new.extra_children,
        new.extra_pets,
    )
    .await?;
    repo::insert_membership(&mut *tx, creator_id, household.id, true).await?;
    tx.commit().await?;

    info!(household_id = household.id, creator_id, "household created");
    Ok(household)
}

/// Deletes a household with its memberships, join codes and inventory.
/// Household-admin only.
pub async fn delete_household(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
) -> Result<(), ApiError> {
    require_household_admin(db, acting_user, household_id).await?;

    let mut tx = db.begin().await?;
    repo::delete_join_codes(&mut *tx, household_id).await?;
    if !Household::delete(&mut *tx, household_id).await? {
        return Err(ApiError::NotFound("household"));
    }
    tx.commit().await?;

    info!(household_id, acting_user, "household deleted");
    Ok(())
}

pub async fn list_households(db: &PgPool, user_id: i64) -> Result<Vec<Household>, ApiError> {
    Ok(Household::list_for_user(db, user_id).await?)
}

async fn require_member(db: &PgPool, user_id: i64, household_id: i64) -> Result<(), ApiError> {
    if repo::is_member(db, user_id, household_id).await? {
        Ok(())
    } else {
        warn!(user_id, household_id, "membership check failed");
        Err(ApiError::Forbidden)
    }
}

async fn require_household_admin(
    db: &PgPool,
    user_id: i64,
    household_id: i64,
) -> Result<(), ApiError> {
    if repo::is_household_admin(db, user_id, household_id).await? {
        Ok(())
    } else {
        warn!(user_id, household_id, "household admin check failed");
        Err(ApiError::Forbidden)
    }
}

pub async fn list_members(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
) -> Result<Vec<MemberRecord>, ApiError> {
    require_member(db, acting_user, household_id).await?;
    Ok(repo::list_members(db, household_id).await?)
}

/// Adds a user (looked up by email) to the household. Household-admin only.
/// A concurrent duplicate add loses to the composite key and reports
/// `AlreadyMember`.
pub async fn add_member(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
    email: &str,
    is_admin: bool,
) -> Result<Membership, ApiError> {
    require_household_admin(db, acting_user, household_id).await?;

    let user = User::find_by_email(db, email.trim().to_lowercase().as_str())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    repo::insert_membership(db, user.id, household_id, is_admin)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyMember
            } else {
                e.into()
            }
        })
}

/// Removes a member. A member may remove themselves; removing anyone else
/// requires household-admin rights. Removing a non-member is a silent no-op.
pub async fn remove_member(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
    target_user: i64,
) -> Result<(), ApiError> {
    if acting_user == target_user {
        require_member(db, acting_user, household_id).await?;
    } else {
        require_household_admin(db, acting_user, household_id).await?;
    }
    repo::delete_membership(db, target_user, household_id).await?;
    info!(household_id, target_user, acting_user, "member removed");
    Ok(())
}

/// Regenerates the household's join code: all prior codes die and exactly one
/// new code survives, atomically. A unique violation (global code collision,
/// or a concurrent regeneration for the same household hitting the unique
/// household_id constraint) retries the whole transaction with a fresh code,
/// whose delete then covers the winner's row.
pub async fn generate_join_code(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
) -> Result<String, ApiError> {
    require_household_admin(db, acting_user, household_id).await?;

    for _ in 0..CODE_ATTEMPTS {
        let code = random_code(CODE_LEN);
        let mut tx = db.begin().await?;
        repo::delete_join_codes(&mut *tx, household_id).await?;
        match repo::insert_join_code(&mut *tx, &code, household_id).await {
            Ok(join_code) => {
                tx.commit().await?;
                info!(household_id, "join code regenerated");
                return Ok(join_code.code);
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                warn!(household_id, "join code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::AlreadyInUse("join code"))
}

/// Redeems a join code for the given user, creating a non-admin membership.
/// Codes stay valid after redemption; only regeneration invalidates them.
pub async fn redeem_join_code(
    db: &PgPool,
    user_id: i64,
    code: &str,
) -> Result<Household, ApiError> {
    let join_code = repo::find_join_code(db, code.trim())
        .await?
        .ok_or(ApiError::NotFound("join code"))?;

    if repo::is_member(db, user_id, join_code.household_id).await? {
        return Err(ApiError::AlreadyMember);
    }

    repo::insert_membership(db, user_id, join_code.household_id, false)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyMember
            } else {
                e.into()
            }
        })?;

    let household = Household::find_by_id(db, join_code.household_id)
        .await?
        .ok_or(ApiError::NotFound("household"))?;

    info!(user_id, household_id = household.id, "join code redeemed");
    Ok(household)
}

/// Drops every code for the household without issuing a new one.
pub async fn revoke_join_codes(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
) -> Result<(), ApiError> {
    require_household_admin(db, acting_user, household_id).await?;
    repo::delete_join_codes(db, household_id).await?;
    info!(household_id, "join codes revoked");
    Ok(())
}

pub async fn preparedness_status(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
    cfg: &PreparednessConfig,
) -> Result<PreparednessStatus, ApiError> {
    require_member(db, acting_user, household_id).await?;

    let household = Household::find_by_id(db, household_id)
        .await?
        .ok_or(ApiError::NotFound("household"))?;
    let totals = repo::inventory_totals(db, household_id).await?;
    let occupancy = Occupancy {
        registered_members: repo::member_count(db, household_id).await?,
        extra_adults: household.extra_adults,
        extra_children: household.extra_children,
        extra_pets: household.extra_pets,
    };
    Ok(compute_status(&totals, &occupancy, cfg))
}

pub struct NewItem {
    pub category_id: i64,
    pub name: String,
    pub amount: f64,
    pub kcal_per_unit: f64,
    pub expires_at: Option<OffsetDateTime>,
}

pub async fn list_items(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
) -> Result<Vec<InventoryItem>, ApiError> {
    require_member(db, acting_user, household_id).await?;
    Ok(repo::list_items(db, household_id).await?)
}

pub async fn add_item(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
    new: NewItem,
) -> Result<InventoryItem, ApiError> {
    require_member(db, acting_user, household_id).await?;

    if new.name.trim().is_empty() {
        return Err(ApiError::Validation("item name is required".into()));
    }
    if new.amount < 0.0 || new.kcal_per_unit < 0.0 {
        return Err(ApiError::Validation("amounts must be non-negative".into()));
    }
    if !repo::category_exists(db, new.category_id).await? {
        return Err(ApiError::NotFound("category"));
    }

    Ok(repo::insert_item(
        db,
        household_id,
        new.category_id,
        new.name.trim(),
        new.amount,
        new.kcal_per_unit,
        new.expires_at,
    )
    .await?)
}

pub async fn remove_item(
    db: &PgPool,
    acting_user: i64,
    household_id: i64,
    item_id: i64,
) -> Result<(), ApiError> {
    require_member(db, acting_user, household_id).await?;
    if !repo::delete_item(db, household_id, item_id).await? {
        return Err(ApiError::NotFound("item"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_the_expected_shape() {
        let code = random_code(CODE_LEN);
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn codes_avoid_ambiguous_characters() {
        for _ in 0..100 {
            let code = random_code(CODE_LEN);
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn consecutive_codes_differ() {
        // 32^8 possibilities; a collision here would be astonishing.
        assert_ne!(random_code(CODE_LEN), random_code(CODE_LEN));
    }
}
