use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::households::repo::{Household, InventoryItem};

#[derive(Debug, Deserialize)]
pub struct CreateHouseholdRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub extra_adults: i32,
    #[serde(default)]
    pub extra_children: i32,
    #[serde(default)]
    pub extra_pets: i32,
}

#[derive(Debug, Serialize)]
pub struct HouseholdResponse {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub extra_adults: i32,
    pub extra_children: i32,
    pub extra_pets: i32,
}

impl From<Household> for HouseholdResponse {
    fn from(h: Household) -> Self {
        Self {
            id: h.id,
            name: h.name,
            latitude: h.latitude,
            longitude: h.longitude,
            extra_adults: h.extra_adults,
            extra_children: h.extra_children,
            extra_pets: h.extra_pets,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct JoinCodeResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct NewItemRequest {
    pub category_id: i64,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub kcal_per_unit: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub amount: f64,
    pub kcal_per_unit: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl From<InventoryItem> for ItemResponse {
    fn from(i: InventoryItem) -> Self {
        Self {
            id: i.id,
            category_id: i.category_id,
            name: i.name,
            amount: i.amount,
            kcal_per_unit: i.kcal_per_unit,
            expires_at: i.expires_at,
        }
    }
}
