use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Response model contract
// =============================================================================

/// A type the client can ask a language model to fill in.
///
/// `description` and `json_schema` are sent with the prompt; `validate` runs
/// after the reply has been deserialized and decides whether to retry.
pub trait ResponseModel: Serialize + DeserializeOwned + Send {
    fn name() -> &'static str;

    fn description() -> &'static str;

    fn json_schema() -> Value;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub model: &'static str,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(
        model: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            model,
            issues: vec![FieldIssue {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.issues.len();
        write!(
            f,
            "{} validation error{} for {}",
            count,
            if count == 1 { "" } else { "s" },
            self.model
        )?;
        for issue in &self.issues {
            write!(f, "\n{}\n  Value error, {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

/// `true` when the text has cased characters and all of them are lowercase.
pub fn is_all_lowercase(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
        && text
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_lowercase)
}

pub fn is_all_uppercase(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
        && text
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

// =============================================================================
// Milestone 1: Prompting with field descriptions and behaviour
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub email: Option<String>,
    pub active: bool,
}

impl User {
    pub fn deactivate(&mut self) -> bool {
        tracing::info!(name = %self.name, "deactivating user");
        self.active = false;
        self.active
    }
}

impl ResponseModel for User {
    fn name() -> &'static str {
        "User"
    }

    fn description() -> &'static str {
        "Represents a user for generating responses."
    }

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "The full name of the user."},
                "age": {"type": "integer", "minimum": 0, "description": "The user's age in years."},
                "email": {
                    "type": ["string", "null"],
                    "description": "The user's email address, if available."
                },
                "active": {
                    "type": "boolean",
                    "description": "Whether the user is currently active."
                }
            },
            "required": ["name", "age", "active"]
        })
    }
}

// =============================================================================
// Milestone 2: Extending a model by composition
// =============================================================================

/// `User` plus admin-only fields. The user fields sit at the top level of the
/// JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl AdminUser {
    pub fn from_user(user: User) -> Self {
        Self {
            user,
            address: None,
            phone: None,
            is_admin: false,
        }
    }

    pub fn promote_to_admin(&mut self) -> bool {
        tracing::info!(name = %self.user.name, "promoting user to admin");
        self.is_admin = true;
        self.is_admin
    }

    pub fn deactivate(&mut self) -> bool {
        self.user.deactivate()
    }
}

impl ResponseModel for AdminUser {
    fn name() -> &'static str {
        "AdminUser"
    }

    fn description() -> &'static str {
        "A user with optional contact details and an admin flag."
    }

    fn json_schema() -> Value {
        let mut schema = User::json_schema();
        if let Some(props) = schema["properties"].as_object_mut() {
            props.insert("address".into(), json!({"type": ["string", "null"]}));
            props.insert("phone".into(), json!({"type": ["string", "null"]}));
            props.insert("is_admin".into(), json!({"type": "boolean", "default": false}));
        }
        schema
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.user.validate().map_err(|err| ValidationError {
            model: Self::name(),
            ..err
        })
    }
}

// =============================================================================
// Milestone 3: Enumerated fields and behaviour on the parsed value
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Web,
    Image,
    Video,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryType::Web => "web",
            QueryType::Image => "image",
            QueryType::Video => "video",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub query_type: QueryType,
    #[serde(default)]
    pub results: Option<Vec<String>>,
}

impl SearchQuery {
    /// Mock search: three numbered results for the query.
    pub fn execute(&self) -> Vec<String> {
        tracing::info!(query = %self.query, query_type = %self.query_type, "executing search");
        (1..=3).map(|i| format!("{} result {}", self.query, i)).collect()
    }
}

impl ResponseModel for SearchQuery {
    fn name() -> &'static str {
        "SearchQuery"
    }

    fn description() -> &'static str {
        "Represents a search query to the language model."
    }

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The search query string."},
                "query_type": {
                    "enum": ["web", "image", "video"],
                    "description": "The type of search (web, image, or video)."
                },
                "results": {
                    "type": ["array", "null"],
                    "items": {"type": "string"},
                    "description": "The list of search results."
                }
            },
            "required": ["query", "query_type"]
        })
    }
}

// =============================================================================
// Milestone 4: Field validators
// =============================================================================

fn name_age_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "age": {"type": "integer", "minimum": 0}
        },
        "required": ["name", "age"]
    })
}

/// Plain extraction target, no validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub name: String,
    pub age: u32,
}

impl ResponseModel for UserResponse {
    fn name() -> &'static str {
        "UserResponse"
    }

    fn description() -> &'static str {
        "A model for extracting user details."
    }

    fn json_schema() -> Value {
        name_age_schema()
    }
}

/// Rejects names written entirely in lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub name: String,
    pub age: u32,
}

impl UserDetail {
    pub fn new(name: impl Into<String>, age: u32) -> Result<Self, ValidationError> {
        let detail = Self {
            name: name.into(),
            age,
        };
        detail.validate()?;
        Ok(detail)
    }
}

impl ResponseModel for UserDetail {
    fn name() -> &'static str {
        "UserDetail"
    }

    fn description() -> &'static str {
        "Represents a user with validation to ensure the name is uppercase."
    }

    fn json_schema() -> Value {
        name_age_schema()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if is_all_lowercase(&self.name) {
            return Err(ValidationError::single(Self::name(), "name", "Name must be ALL CAPS"));
        }
        Ok(())
    }
}

/// Requires the whole name in uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UppercaseUser {
    pub name: String,
    pub age: u32,
}

impl ResponseModel for UppercaseUser {
    fn name() -> &'static str {
        "UserWithLogging"
    }

    fn description() -> &'static str {
        "A user whose name must be uppercase."
    }

    fn json_schema() -> Value {
        name_age_schema()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !is_all_uppercase(&self.name) {
            return Err(ValidationError::single(Self::name(), "name", "Name must be uppercase"));
        }
        Ok(())
    }
}

/// Every age is rejected, so extraction always exhausts its retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectingUser {
    pub name: String,
    pub age: u32,
}

impl ResponseModel for RejectingUser {
    fn name() -> &'static str {
        "ValidatedUser"
    }

    fn description() -> &'static str {
        "A user model whose age validator never passes."
    }

    fn json_schema() -> Value {
        name_age_schema()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Err(ValidationError::single(
            Self::name(),
            "age",
            format!("Invalid age: {}", self.age),
        ))
    }
}
