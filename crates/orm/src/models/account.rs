use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::record::NormalizedRecord;
use crate::relationships::{DetailTypeRegistry, DetailTypeRegistryBuilder};

/// Discriminator values of the `Account` model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    BankAccount,
    Card,
}

impl AccountType {
    pub const ALL: [AccountType; 2] = [AccountType::BankAccount, AccountType::Card];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::BankAccount => "BankAccount",
            AccountType::Card => "Card",
        }
    }
}

impl FromStr for AccountType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BankAccount" => Ok(AccountType::BankAccount),
            "Card" => Ok(AccountType::Card),
            other => Err(ModelError::Validation(format!("unknown account type '{}'", other))),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub bank_name: Option<String>,
    pub last4: Option<String>,
    pub routing_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub provider_name: Option<String>,
    pub last4: Option<String>,
    pub expiration: Option<String>,
}

/// Exactly one detail record, chosen by the account type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AccountDetails {
    BankAccount(BankAccountDetails),
    Card(CardDetails),
}

impl AccountDetails {
    pub fn account_type(&self) -> AccountType {
        match self {
            AccountDetails::BankAccount(_) => AccountType::BankAccount,
            AccountDetails::Card(_) => AccountType::Card,
        }
    }

    /// Decode a plain details object as the variant for `account_type`
    pub fn from_value(account_type: AccountType, value: Value) -> ModelResult<Self> {
        Ok(match account_type {
            AccountType::BankAccount => AccountDetails::BankAccount(serde_json::from_value(value)?),
            AccountType::Card => AccountDetails::Card(serde_json::from_value(value)?),
        })
    }
}

/// Typed view of a normalized `Account` record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub details_id: Option<i64>,
    pub details: Option<AccountDetails>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<NormalizedRecord> for Account {
    type Error = ModelError;

    fn try_from(record: NormalizedRecord) -> ModelResult<Self> {
        let account_type: AccountType = record
            .get_str("type")
            .ok_or_else(|| ModelError::Validation("account has no type".to_string()))?
            .parse()?;

        let timestamp = |field: &str| -> ModelResult<Option<DateTime<Utc>>> {
            match record.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            }
        };
        let created_at = timestamp("created_at")?;
        let updated_at = timestamp("updated_at")?;

        let id = record.get("id").and_then(Value::as_i64);
        let details_id = record.get("details_id").and_then(Value::as_i64);

        let details = match record.into_parts().1 {
            Some(value) => Some(AccountDetails::from_value(account_type, value)?),
            None => None,
        };

        Ok(Account {
            id,
            account_type,
            details_id,
            details,
            created_at,
            updated_at,
        })
    }
}

/// Registry for `Account`: `bankAccountDetails` and `cardDetails`
pub fn account_registry() -> ModelResult<DetailTypeRegistry> {
    let mut builder = DetailTypeRegistryBuilder::new();
    for account_type in AccountType::ALL {
        builder.register_type_by_convention(account_type.as_str())?;
    }
    Ok(builder.build()?)
}
