use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Household {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub extra_adults: i32,
    pub extra_children: i32,
    pub extra_pets: i32,
    pub created_at: OffsetDateTime,
}

/// Membership row; identified by the (user, household) pair itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub user_id: i64,
    pub household_id: i64,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

/// Membership joined with the member's public user fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberRecord {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JoinCode {
    pub code: String,
    pub household_id: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub household_id: i64,
    pub category_id: i64,
    pub name: String,
    pub amount: f64,
    pub kcal_per_unit: f64,
    pub expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Aggregated inventory: total kcal across food items and total litres
/// across water items.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct InventoryTotals {
    pub food_kcal: f64,
    pub water_litres: f64,
}

impl Household {
    pub async fn insert<'e>(
        ex: impl PgExecutor<'e>,
        name: &str,
        latitude: f64,
        longitude: f64,
        extra_adults: i32,
        extra_children: i32,
        extra_pets: i32,
    ) -> sqlx::Result<Household> {
        sqlx::query_as::<_, Household>(
            r#"
            INSERT INTO households (name, latitude, longitude, extra_adults, extra_children, extra_pets)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, latitude, longitude, extra_adults, extra_children, extra_pets, created_at
            "#,
        )
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(extra_adults)
        .bind(extra_children)
        .bind(extra_pets)
        .fetch_one(ex)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Household>> {
        sqlx::query_as::<_, Household>(
            r#"
            SELECT id, name, latitude, longitude, extra_adults, extra_children, extra_pets, created_at
            FROM households
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Household>> {
        sqlx::query_as::<_, Household>(
            r#"
            SELECT h.id, h.name, h.latitude, h.longitude,
                   h.extra_adults, h.extra_children, h.extra_pets, h.created_at
            FROM households h
            JOIN household_memberships m ON m.household_id = h.id
            WHERE m.user_id = $1
            ORDER BY h.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM households WHERE id = $1")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub async fn is_member(db: &PgPool, user_id: i64, household_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM household_memberships
            WHERE user_id = $1 AND household_id = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(household_id)
    .fetch_one(db)
    .await
}

pub async fn is_household_admin(db: &PgPool, user_id: i64, household_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM household_memberships
            WHERE user_id = $1 AND household_id = $2 AND is_admin
        )
        "#,
    )
    .bind(user_id)
    .bind(household_id)
    .fetch_one(db)
    .await
}

/// Fails with a unique violation when the (user, household) pair already
/// exists; the composite primary key is authoritative, also under races.
pub async fn insert_membership<'e>(
    ex: impl PgExecutor<'e>,
    user_id: i64,
    household_id: i64,
    is_admin: bool,
) -> sqlx::Result<Membership> {
    sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO household_memberships (user_id, household_id, is_admin)
        VALUES ($1, $2, $3)
        RETURNING user_id, household_id, is_admin, created_at
        "#,
    )
    .bind(user_id)
    .bind(household_id)
    .bind(is_admin)
    .fetch_one(ex)
    .await
}

/// Silent no-op when no such membership exists.
pub async fn delete_membership(db: &PgPool, user_id: i64, household_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM household_memberships WHERE user_id = $1 AND household_id = $2")
        .bind(user_id)
        .bind(household_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list_members(db: &PgPool, household_id: i64) -> sqlx::Result<Vec<MemberRecord>> {
    sqlx::query_as::<_, MemberRecord>(
        r#"
        SELECT m.user_id, u.email, u.first_name, u.last_name, m.is_admin
        FROM household_memberships m
        JOIN users u ON u.id = m.user_id
        WHERE m.household_id = $1
        ORDER BY m.created_at
        "#,
    )
    .bind(household_id)
    .fetch_all(db)
    .await
}

pub async fn member_count(db: &PgPool, household_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM household_memberships WHERE household_id = $1",
    )
    .bind(household_id)
    .fetch_one(db)
    .await
}

pub async fn find_join_code(db: &PgPool, code: &str) -> sqlx::Result<Option<JoinCode>> {
    sqlx::query_as::<_, JoinCode>(
        "SELECT code, household_id, created_at FROM join_codes WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(db)
    .await
}

pub async fn delete_join_codes<'e>(ex: impl PgExecutor<'e>, household_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM join_codes WHERE household_id = $1")
        .bind(household_id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn insert_join_code<'e>(
    ex: impl PgExecutor<'e>,
    code: &str,
    household_id: i64,
) -> sqlx::Result<JoinCode> {
    sqlx::query_as::<_, JoinCode>(
        r#"
        INSERT INTO join_codes (code, household_id)
        VALUES ($1, $2)
        RETURNING code, household_id, created_at
        "#,
    )
    .bind(code)
    .bind(household_id)
    .fetch_one(ex)
    .await
}

pub async fn list_items(db: &PgPool, household_id: i64) -> sqlx::Result<Vec<InventoryItem>> {
    sqlx::query_as::<_, InventoryItem>(
        r#"
        SELECT id, household_id, category_id, name, amount, kcal_per_unit, expires_at, created_at
        FROM inventory_items
        WHERE household_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(household_id)
    .fetch_all(db)
    .await
}

pub async fn insert_item(
    db: &PgPool,
    household_id: i64,
    category_id: i64,
    name: &str,
    amount: f64,
    kcal_per_unit: f64,
    expires_at: Option<OffsetDateTime>,
) -> sqlx::Result<InventoryItem> {
    sqlx::query_as::<_, InventoryItem>(
        r#"
        INSERT INTO inventory_items (household_id, category_id, name, amount, kcal_per_unit, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, household_id, category_id, name, amount, kcal_per_unit, expires_at, created_at
        "#,
    )
    .bind(household_id)
    .bind(category_id)
    .bind(name)
    .bind(amount)
    .bind(kcal_per_unit)
    .bind(expires_at)
    .fetch_one(db)
    .await
}

pub async fn delete_item(db: &PgPool, household_id: i64, item_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1 AND household_id = $2")
        .bind(item_id)
        .bind(household_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Food kcal and water litres for a household, classified by category kind.
pub async fn inventory_totals(db: &PgPool, household_id: i64) -> sqlx::Result<InventoryTotals> {
    sqlx::query_as::<_, InventoryTotals>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN c.kind = 'food' THEN i.amount * i.kcal_per_unit END), 0)::FLOAT8
                AS food_kcal,
            COALESCE(SUM(CASE WHEN c.kind = 'water' THEN i.amount END), 0)::FLOAT8
                AS water_litres
        FROM inventory_items i
        JOIN inventory_categories c ON c.id = i.category_id
        WHERE i.household_id = $1
        "#,
    )
    .bind(household_id)
    .fetch_one(db)
    .await
}

pub async fn category_exists(db: &PgPool, category_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM inventory_categories WHERE id = $1)",
    )
    .bind(category_id)
    .fetch_one(db)
    .await
}
