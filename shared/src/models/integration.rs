//! Delivery platform integrations

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    TrendyolGo,
    Getir,
    Migros,
    Yemeksepeti,
}

impl Platform {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::TrendyolGo => "trendyol_go",
            Platform::Getir => "getir",
            Platform::Migros => "migros",
            Platform::Yemeksepeti => "yemeksepeti",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trendyol_go" => Ok(Platform::TrendyolGo),
            "getir" => Ok(Platform::Getir),
            "migros" => Ok(Platform::Migros),
            "yemeksepeti" => Ok(Platform::Yemeksepeti),
            other => Err(AppError::new(ErrorCode::UnknownPlatform).with_detail("platform", other)),
        }
    }
}

/// Integration as listed to the tenant admin
///
/// Credentials are write-only: the listing only reports whether each is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformIntegration {
    pub platform: Platform,
    pub seller_id: Option<String>,
    pub store_name: Option<String>,
    pub store_link: Option<String>,
    pub is_active: bool,
    pub has_api_key: bool,
    pub has_api_secret: bool,
    pub has_token: bool,
    pub updated_at: i64,
}

/// `PUT /api/v1/integrations/:platform`
///
/// Absent credentials keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationUpsert {
    pub seller_id: Option<String>,
    pub store_name: Option<String>,
    pub store_link: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub token: Option<String>,
    pub is_active: Option<bool>,
}
