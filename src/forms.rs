use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Post;

/// Key under which errors that belong to no single field are reported.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const TITLE_EXISTS: &str = "Post Title Exists!";
pub const MALFORMED: &str = "Malformed form data.";
pub const NULL_CHARACTERS: &str = "Null characters are not allowed.";

/// Upper bound on `Post.title`, in characters.
pub const TITLE_MAX_LENGTH: usize = 200;

/// FormErrors
///
/// Validation messages keyed by field name, with form-level messages under `__all__`.
/// Serializes as a plain JSON object, e.g. `{"title": ["This field is required."]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one form-level message.
    pub fn non_field(message: &str) -> Self {
        let mut errors = Self::new();
        errors.add_non_field(message);
        errors
    }

    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add_field(NON_FIELD_ERRORS, message);
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// PostFormData
///
/// The untyped submission exactly as decoded from an urlencoded body.
/// Any field may be missing; nothing has been checked yet.
#[derive(Debug, Clone, Default)]
pub struct PostFormData {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// PostInput
///
/// A submission that passed field cleaning. Business rules (title uniqueness)
/// have not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub text: String,
}

impl PostFormData {
    /// Decodes an `application/x-www-form-urlencoded` body.
    ///
    /// A repeated key keeps its last value. Unknown keys are ignored.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FormErrors> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
            tracing::debug!("undecodable form body: {}", e);
            FormErrors::non_field(MALFORMED)
        })?;

        let mut data = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => data.title = Some(value),
                "text" => data.text = Some(value),
                _ => {}
            }
        }
        Ok(data)
    }

    /// Field cleaning: trims both fields and enforces presence and length.
    pub fn clean(&self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_char_field(&mut errors, "title", self.title.as_deref(), Some(TITLE_MAX_LENGTH));
        let text = clean_char_field(&mut errors, "text", self.text.as_deref(), None);

        match (title, text) {
            (Some(title), Some(text)) if errors.is_empty() => Ok(PostInput { title, text }),
            _ => Err(errors),
        }
    }
}

fn clean_char_field(
    errors: &mut FormErrors,
    name: &str,
    raw: Option<&str>,
    max_length: Option<usize>,
) -> Option<String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.add_field(name, REQUIRED);
        return None;
    }
    // Postgres text columns cannot hold NUL.
    if value.contains('\0') {
        errors.add_field(name, NULL_CHARACTERS);
        return None;
    }
    if let Some(max) = max_length {
        let length = value.chars().count();
        if length > max {
            errors.add_field(
                name,
                format!("Ensure this value has at most {max} characters (it has {length})."),
            );
            return None;
        }
    }
    Some(value.to_string())
}

/// PostForm
///
/// The form as shown to the client: on GET it is empty (new) or pre-filled (edit);
/// after a rejected submission it echoes the input together with its errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PostForm {
    /// Set when the form edits an existing post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub title: String,
    pub text: String,
    pub errors: FormErrors,
}

impl PostForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_post(post: &Post) -> Self {
        Self {
            post_id: Some(post.id),
            title: post.title.clone(),
            text: post.text.clone(),
            errors: FormErrors::new(),
        }
    }

    /// Re-displays a rejected submission.
    pub fn bound(post_id: Option<i64>, data: &PostFormData, errors: FormErrors) -> Self {
        Self {
            post_id,
            title: data.title.clone().unwrap_or_default(),
            text: data.text.clone().unwrap_or_default(),
            errors,
        }
    }
}
