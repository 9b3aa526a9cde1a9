//! Entity form lifecycle: one session per open create/edit form.
//!
//! The session is presentation-agnostic. It owns the field values,
//! validates them against a per-kind schema, and talks to the storage
//! boundary through [`FormGateway`]. Callers render the fields, feed
//! edits back in with [`FormSession::set`], and act on the returned
//! [`SessionOutcome`] (refresh, navigate, notify).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Whether the session creates a new entity or edits an existing one.
/// Decided once at construction, never re-inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Relation(Vec<Uuid>),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { min_len: usize },
    Number { min: f64 },
    Flag,
    /// Multi-select of related-entity ids. Required relations must be
    /// non-empty.
    Relation,
    List,
    /// Free-form JSON edited as text. Unparsable input degrades to an
    /// empty object, matching the original editor behavior.
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Per-entity-kind form description.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    /// Collection segment of the API path, e.g. "categories".
    pub collection: &'static str,
    /// Human name used in notices, e.g. "Category".
    pub display_name: &'static str,
    /// Where to navigate after a completed action.
    pub list_path: &'static str,
    /// Notice wording when a delete is blocked by dependent rows.
    pub delete_hint: &'static str,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} {message}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every violated field, so the caller can surface each message next
/// to its input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed on {} field(s)", violations.len())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server error")]
    Internal,
}

/// Storage boundary for form sessions. One call per submit or
/// confirmed delete, never more.
#[async_trait]
pub trait FormGateway: Send + Sync {
    async fn create(&self, collection: &str, body: Value) -> Result<Value, GatewayError>;
    async fn update(&self, collection: &str, id: Uuid, body: Value)
        -> Result<Value, GatewayError>;
    async fn delete(&self, collection: &str, id: Uuid) -> Result<Value, GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// User-facing toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Failure, message: message.into() }
    }
}

/// Instructions for the caller after a completed action: refresh the
/// backing list, navigate to it, show the notice.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub entity: Value,
    pub refresh: bool,
    pub navigate_to: String,
    pub notice: Notice,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A competing action (submit or delete) is already open or in
    /// flight.
    #[error("another action is in progress")]
    Busy,
    #[error("no entity to delete in create mode")]
    NotEditing,
    #[error("delete has not been confirmed")]
    DeleteNotRequested,
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The gateway call failed. Field values are retained; `notice`
    /// carries the user-facing wording.
    #[error("gateway call failed: {source}")]
    Gateway { source: GatewayError, notice: Notice },
}

#[derive(Debug)]
pub struct FormSession {
    schema: FormSchema,
    mode: FormMode,
    fields: BTreeMap<&'static str, FieldValue>,
    is_submitting: bool,
    is_confirming_delete: bool,
}

impl FormSession {
    /// Open a create session with type-specific defaults.
    pub fn create(schema: FormSchema) -> Self {
        let fields = default_fields(&schema);
        Self { schema, mode: FormMode::Create, fields, is_submitting: false, is_confirming_delete: false }
    }

    /// Open an edit session seeded from an existing entity. Initial
    /// values for names the schema does not know are dropped.
    pub fn edit(schema: FormSchema, id: Uuid, initial: Vec<(&'static str, FieldValue)>) -> Self {
        let mut fields = default_fields(&schema);
        for (name, value) in initial {
            if fields.contains_key(name) {
                fields.insert(name, value);
            }
        }
        Self { schema, mode: FormMode::Edit(id), fields, is_submitting: false, is_confirming_delete: false }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.is_confirming_delete
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Replace one field value. Unknown names are rejected at the
    /// boundary instead of accumulating silently.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        let key = self
            .schema
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.fields.insert(key, value);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.payload().map(|_| ())
    }

    /// Validate and coerce the current values into the JSON body the
    /// gateway expects. Fails with every violated field at once.
    pub fn payload(&self) -> Result<Value, ValidationError> {
        let mut body = serde_json::Map::new();
        let mut violations = Vec::new();

        for field in &self.schema.fields {
            let value = self.fields.get(field.name);
            match coerce(field, value) {
                Ok(value) => {
                    body.insert(field.name.to_string(), value);
                }
                Err(message) => violations.push(FieldViolation { field: field.name, message }),
            }
        }

        if violations.is_empty() {
            Ok(Value::Object(body))
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Submit the form: exactly one gateway call, create or update
    /// depending on the mode. Validation failures never reach the
    /// gateway. On failure the field values are left intact so the
    /// user can retry.
    pub async fn submit(&mut self, gateway: &dyn FormGateway) -> Result<SessionOutcome, FormError> {
        if self.is_submitting || self.is_confirming_delete {
            return Err(FormError::Busy);
        }
        let body = self.payload()?;

        self.is_submitting = true;
        let result = match self.mode {
            FormMode::Create => gateway.create(self.schema.collection, body).await,
            FormMode::Edit(id) => gateway.update(self.schema.collection, id, body).await,
        };
        self.is_submitting = false;

        match result {
            Ok(entity) => {
                let verb = match self.mode {
                    FormMode::Create => "created",
                    FormMode::Edit(_) => "updated",
                };
                Ok(SessionOutcome {
                    entity,
                    refresh: true,
                    navigate_to: self.schema.list_path.to_string(),
                    notice: Notice::success(format!("{} {verb}.", self.schema.display_name)),
                })
            }
            Err(source) => Err(FormError::Gateway {
                source,
                notice: Notice::failure("Something went wrong."),
            }),
        }
    }

    /// Open the delete confirmation. No network call happens here.
    pub fn request_delete(&mut self) -> Result<(), FormError> {
        if !matches!(self.mode, FormMode::Edit(_)) {
            return Err(FormError::NotEditing);
        }
        if self.is_submitting {
            return Err(FormError::Busy);
        }
        self.is_confirming_delete = true;
        Ok(())
    }

    /// Close the confirmation without any network call.
    pub fn cancel_delete(&mut self) {
        self.is_confirming_delete = false;
    }

    /// Issue the confirmed delete: exactly one gateway call. Both
    /// flags reset on every exit path. Conflicts surface the schema's
    /// hint wording instead of a generic failure.
    pub async fn confirm_delete(
        &mut self,
        gateway: &dyn FormGateway,
    ) -> Result<SessionOutcome, FormError> {
        let id = match self.mode {
            FormMode::Edit(id) => id,
            FormMode::Create => return Err(FormError::NotEditing),
        };
        if !self.is_confirming_delete {
            return Err(FormError::DeleteNotRequested);
        }
        if self.is_submitting {
            return Err(FormError::Busy);
        }

        self.is_submitting = true;
        let result = gateway.delete(self.schema.collection, id).await;
        self.is_submitting = false;
        self.is_confirming_delete = false;

        match result {
            Ok(entity) => Ok(SessionOutcome {
                entity,
                refresh: true,
                navigate_to: self.schema.list_path.to_string(),
                notice: Notice::success(format!("{} deleted.", self.schema.display_name)),
            }),
            Err(source) => {
                let notice = match &source {
                    GatewayError::Conflict(_) => Notice::failure(self.schema.delete_hint),
                    _ => Notice::failure("Something went wrong."),
                };
                Err(FormError::Gateway { source, notice })
            }
        }
    }
}

fn default_fields(schema: &FormSchema) -> BTreeMap<&'static str, FieldValue> {
    schema
        .fields
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldKind::Text { .. } | FieldKind::Json => FieldValue::Text(String::new()),
                FieldKind::Number { .. } => FieldValue::Number(0.0),
                FieldKind::Flag => FieldValue::Flag(false),
                FieldKind::Relation => FieldValue::Relation(Vec::new()),
                FieldKind::List => FieldValue::List(Vec::new()),
            };
            (field.name, value)
        })
        .collect()
}

/// Coerce one field value against its schema, producing the JSON to
/// submit or a violation message.
fn coerce(field: &FieldSchema, value: Option<&FieldValue>) -> Result<Value, String> {
    match (field.kind, value) {
        (FieldKind::Text { min_len }, Some(FieldValue::Text(text))) => {
            let min = if field.required { min_len.max(1) } else { min_len };
            if field.required && text.trim().is_empty() {
                Err("is required".to_string())
            } else if !text.is_empty() && text.chars().count() < min {
                Err(format!("must be at least {min} characters"))
            } else {
                Ok(json!(text))
            }
        }
        (FieldKind::Number { min }, Some(FieldValue::Number(n))) => {
            if *n < min {
                Err(format!("must be at least {min}"))
            } else {
                Ok(json!(n))
            }
        }
        // Numeric fields accept text input and coerce it.
        (FieldKind::Number { min }, Some(FieldValue::Text(text))) => {
            match text.trim().parse::<f64>() {
                Ok(n) if n >= min => Ok(json!(n)),
                Ok(_) => Err(format!("must be at least {min}")),
                Err(_) => Err("must be a number".to_string()),
            }
        }
        (FieldKind::Flag, Some(FieldValue::Flag(flag))) => Ok(json!(flag)),
        (FieldKind::Relation, Some(FieldValue::Relation(ids))) => {
            if field.required && ids.is_empty() {
                Err("needs at least one selection".to_string())
            } else {
                Ok(json!(ids))
            }
        }
        (FieldKind::List, Some(FieldValue::List(items))) => Ok(json!(items)),
        (FieldKind::Json, Some(FieldValue::Text(text))) => {
            if text.trim().is_empty() {
                Ok(json!({}))
            } else {
                Ok(serde_json::from_str(text).unwrap_or_else(|_| json!({})))
            }
        }
        (_, Some(_)) => Err("has the wrong type".to_string()),
        (_, None) => Err("is missing".to_string()),
    }
}
