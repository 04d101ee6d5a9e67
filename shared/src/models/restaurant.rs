//! Restaurant (tenant) model

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contract statuses tracked by the CRM
pub const CONTRACT_STATUSES: [&str; 4] = ["trial", "active", "expired", "cancelled"];

/// Restaurant entity with its CRM fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub subscription_plan: String,
    pub logo_url: Option<String>,
    pub contract_status: String,
    pub contract_months: Option<i32>,
    /// `YYYY-MM-DD`
    pub contract_start_date: Option<String>,
    pub monthly_fee: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// What customers and the public menu see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRestaurant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<&Restaurant> for PublicRestaurant {
    fn from(r: &Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            slug: r.slug.clone(),
            logo_url: r.logo_url.clone(),
            phone: r.phone.clone(),
            address: r.address.clone(),
        }
    }
}

/// CRM: create a tenant together with its first admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreate {
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub subscription_plan: Option<String>,
    pub contract_status: Option<String>,
    pub contract_months: Option<i32>,
    pub contract_start_date: Option<String>,
    pub monthly_fee: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: Option<String>,
}

/// CRM: operator-side update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub subscription_plan: Option<String>,
    pub contract_status: Option<String>,
    pub contract_months: Option<i32>,
    pub contract_start_date: Option<String>,
    pub monthly_fee: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Tenant admin: own restaurant profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantProfileUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Lowercase ASCII letters, digits and inner dashes, 2..=64 chars
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid = (2..=64).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");
    if !valid {
        return Err(AppError::new(ErrorCode::SlugInvalid).with_detail("slug", slug));
    }
    Ok(())
}

pub fn validate_contract_status(status: &str) -> Result<(), AppError> {
    if !CONTRACT_STATUSES.contains(&status) {
        return Err(AppError::validation(format!("Unknown contract status: {status}"))
            .with_detail("allowed", CONTRACT_STATUSES.to_vec()));
    }
    Ok(())
}

/// Validate an optional `YYYY-MM-DD` contract start date
pub fn validate_contract_start(date: Option<&str>) -> Result<(), AppError> {
    if let Some(d) = date {
        crate::report::parse_date(d)?;
    }
    Ok(())
}

impl RestaurantCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::with_message(ErrorCode::RequiredField, "name is required"));
        }
        validate_slug(&self.slug)?;
        if let Some(status) = &self.contract_status {
            validate_contract_status(status)?;
        }
        validate_contract_start(self.contract_start_date.as_deref())?;
        if let Some(fee) = self.monthly_fee {
            crate::money::validate_price(fee)?;
        }
        super::user::validate_email(&self.admin_email)?;
        super::user::validate_password(&self.admin_password)?;
        Ok(())
    }
}

impl RestaurantUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(status) = &self.contract_status {
            validate_contract_status(status)?;
        }
        validate_contract_start(self.contract_start_date.as_deref())?;
        if let Some(fee) = self.monthly_fee {
            crate::money::validate_price(fee)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("kofteci-ramiz").is_ok());
        assert!(validate_slug("cafe42").is_ok());
        for bad in ["", "a", "Kofteci", "kofteci ramiz", "-abc", "abc-", "a--b", "çay-evi"] {
            assert_eq!(
                validate_slug(bad).unwrap_err().code,
                ErrorCode::SlugInvalid,
                "{bad}"
            );
        }
    }

    #[test]
    fn contract_status_rules() {
        assert!(validate_contract_status("trial").is_ok());
        assert!(validate_contract_status("paused").is_err());
        assert!(validate_contract_start(Some("2025-02-01")).is_ok());
        assert!(validate_contract_start(Some("01.02.2025")).is_err());
        assert!(validate_contract_start(None).is_ok());
    }
}
