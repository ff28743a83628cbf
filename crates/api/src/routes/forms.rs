//! Typed access to multipart form bodies.
//!
//! Handlers that accept file uploads read the whole multipart body into a
//! [`MultipartForm`] first, then validate against it. Text fields are
//! trimmed, and empty values count as absent — which is what makes
//! partial updates treat them as "no change".

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use rust_decimal::Decimal;

use crate::error::ApiError;

/// The form field that carries a file upload.
const IMAGE_FIELD: &str = "image";

/// An uploaded image file.
#[derive(Debug)]
pub struct UploadedImage {
    /// Client-supplied file name, if any (used for the extension only).
    pub file_name: Option<String>,
    /// Raw file content.
    pub bytes: Bytes,
}

/// A fully read multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    image: Option<UploadedImage>,
}

impl MultipartForm {
    /// Read all fields of a multipart body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the body is not valid multipart
    /// form data.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(invalid_form)?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage { file_name, bytes });
                }
            } else {
                let value = field.text().await.map_err(invalid_form)?;
                let value = value.trim();
                if !value.is_empty() {
                    form.fields.insert(name, value.to_owned());
                }
            }
        }

        Ok(form)
    }

    /// A trimmed, non-empty text field, or `None` when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take the uploaded image out of the form, if one was sent.
    pub fn take_image(&mut self) -> Option<UploadedImage> {
        self.image.take()
    }

    /// Whether an image file was uploaded.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Parse a decimal field when present; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` with `message` when the field is
    /// present but not a valid number.
    pub fn decimal(&self, name: &str, message: &str) -> Result<Option<Decimal>, ApiError> {
        self.text(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ApiError::BadRequest(message.to_owned()))
            })
            .transpose()
    }

    /// Parse an integer field when present; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` with `message` when the field is
    /// present but not a valid integer.
    pub fn integer(&self, name: &str, message: &str) -> Result<Option<i32>, ApiError> {
        self.text(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ApiError::BadRequest(message.to_owned()))
            })
            .transpose()
    }
}

fn invalid_form(_: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest("Invalid multipart form data".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            image: None,
        }
    }

    #[test]
    fn test_text_absent_for_missing_field() {
        let form = form_with(&[("name", "Mango")]);
        assert_eq!(form.text("name"), Some("Mango"));
        assert_eq!(form.text("rating"), None);
    }

    #[test]
    fn test_decimal_absent_is_no_error() {
        let form = form_with(&[]);
        let parsed = form
            .decimal("rating", "Rating must be a number")
            .expect("absence is fine");
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_decimal_present_and_valid() {
        let form = form_with(&[("price", "19.99")]);
        let parsed = form
            .decimal("price", "Price must be a number")
            .expect("valid number");
        assert_eq!(parsed, Some("19.99".parse().expect("decimal")));
    }

    #[test]
    fn test_decimal_present_and_invalid() {
        let form = form_with(&[("price", "cheap")]);
        let err = form
            .decimal("price", "Price must be a number")
            .expect_err("must fail");
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Price must be a number"));
    }

    #[test]
    fn test_integer_present_and_invalid() {
        let form = form_with(&[("best_seller", "yes")]);
        let err = form
            .integer("best_seller", "Best seller must be an integer number")
            .expect_err("must fail");
        assert!(
            matches!(err, ApiError::BadRequest(msg) if msg == "Best seller must be an integer number")
        );
    }
}
