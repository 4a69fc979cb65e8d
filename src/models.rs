use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    #[default]
    #[serde(rename = "Низкий", alias = "low")]
    Low,
    #[serde(rename = "Высокий", alias = "high")]
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub title: String,
    pub due_date: Option<NaiveDate>, // "YYYY-MM-DD"
    pub priority: Priority,
    pub notes: Option<String>,
    pub done: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

// User-editable part of a task, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub subject: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub updated_at: DateTime<FixedOffset>,
}

// Local credential record, never sent over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: Uuid,
    pub email: String,
    pub salt: String,
    pub password_hash: String, // hex sha256(salt || password)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Db {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}
