use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl UserProfile {
    /// "First Last" when set, otherwise the username
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Editable profile fields. `role` and `profile_image` are read-only server side.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StoreInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "super::de::optional_amount")]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub bank_details: Option<String>,
    #[serde(default)]
    pub store_image: Option<String>,
}

/// Store settings form. Sent as multipart so an image can ride along.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreInfoUpdate {
    pub about: String,
    pub contact_email: String,
    pub currency: String,
    pub delivery_fee: String,
    pub bank_details: String,
}

impl StoreInfoUpdate {
    pub fn from_info(info: &StoreInfo) -> Self {
        Self {
            about: info.about.clone().unwrap_or_default(),
            contact_email: info.contact_email.clone().unwrap_or_default(),
            currency: info.currency.clone().unwrap_or_default(),
            delivery_fee: info
                .delivery_fee
                .map(|fee| format!("{:.2}", fee))
                .unwrap_or_default(),
            bank_details: info.bank_details.clone().unwrap_or_default(),
        }
    }

    /// Text parts in form order
    pub fn fields(&self) -> Vec<(String, String)> {
        [
            ("about", &self.about),
            ("contact_email", &self.contact_email),
            ("currency", &self.currency),
            ("delivery_fee", &self.delivery_fee),
            ("bank_details", &self.bank_details),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}
