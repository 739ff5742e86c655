//! Client-side form validation.
//!
//! Mirrors what the remote API enforces closely enough to give inline
//! feedback before a request is made. Failures here never reach the wire.

use crate::error::{FieldIssue, ValidationError};

/// Maximum accepted upload size: 2 MiB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// An image to upload, read fully into memory.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// MIME type guessed from the file extension.
    #[must_use]
    pub fn mime(&self) -> mime_guess::Mime {
        mime_guess::from_path(&self.file_name).first_or_octet_stream()
    }

    fn collect_issues(&self, field: &'static str, issues: &mut Vec<FieldIssue>) {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            issues.push(FieldIssue {
                field,
                message: "Max image size is 2MB".to_string(),
            });
        }
        if self.mime().type_() != mime_guess::mime::IMAGE {
            issues.push(FieldIssue {
                field,
                message: "Only images are allowed".to_string(),
            });
        }
    }
}

/// A post to create.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: Option<String>,
    pub body: String,
    pub image: Option<ImageAttachment>,
}

impl NewPost {
    /// # Errors
    ///
    /// Returns every violated rule, attributed to its field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.body.trim().is_empty() {
            issues.push(FieldIssue {
                field: "body",
                message: "Post content is required".to_string(),
            });
        }
        if let Some(image) = &self.image {
            image.collect_issues("image", &mut issues);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Login credentials.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every violated rule, attributed to its field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.username.trim().is_empty() {
            issues.push(FieldIssue {
                field: "username",
                message: "Username is required".to_string(),
            });
        }
        if self.password.is_empty() {
            issues.push(FieldIssue {
                field: "password",
                message: "Password is required".to_string(),
            });
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Registration form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub image: Option<ImageAttachment>,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every violated rule, attributed to its field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.name.trim().len() < 2 {
            issues.push(FieldIssue {
                field: "name",
                message: "Name is required".to_string(),
            });
        }
        if self.username.trim().len() < 3 {
            issues.push(FieldIssue {
                field: "username",
                message: "Username must be at least 3 characters".to_string(),
            });
        }
        if self.email.parse::<email_address::EmailAddress>().is_err() {
            issues.push(FieldIssue {
                field: "email",
                message: "Enter a valid email address".to_string(),
            });
        }
        if self.password.len() < 6 {
            issues.push(FieldIssue {
                field: "password",
                message: "Password must be at least 6 characters".to_string(),
            });
        }
        if self.password != self.password_confirmation {
            issues.push(FieldIssue {
                field: "password_confirmation",
                message: "Passwords do not match".to_string(),
            });
        }
        if let Some(image) = &self.image {
            image.collect_issues("image", &mut issues);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Validate and normalize a comment body.
///
/// # Errors
///
/// Returns an error when the body is empty after trimming.
pub fn validate_comment(body: &str) -> Result<String, ValidationError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single(
            "body",
            "Comment content is required",
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(len: usize) -> ImageAttachment {
        ImageAttachment {
            file_name: "photo.png".to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_new_post_requires_body() {
        let post = NewPost {
            title: None,
            body: "   ".to_string(),
            image: None,
        };
        let err = post.validate().unwrap_err();
        assert_eq!(err.issues[0].field, "body");
    }

    #[test]
    fn test_new_post_accepts_minimal() {
        let post = NewPost {
            title: None,
            body: "hello".to_string(),
            image: None,
        };
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_image_size_cap() {
        let post = NewPost {
            title: None,
            body: "hello".to_string(),
            image: Some(png(MAX_IMAGE_BYTES + 1)),
        };
        let err = post.validate().unwrap_err();
        assert_eq!(err.issues[0].message, "Max image size is 2MB");

        let post = NewPost {
            title: None,
            body: "hello".to_string(),
            image: Some(png(MAX_IMAGE_BYTES)),
        };
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_non_image_upload_rejected() {
        let post = NewPost {
            title: None,
            body: "hello".to_string(),
            image: Some(ImageAttachment {
                file_name: "notes.pdf".to_string(),
                bytes: vec![0; 10],
            }),
        };
        let err = post.validate().unwrap_err();
        assert_eq!(err.issues[0].message, "Only images are allowed");
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let form = LoginForm {
            username: String::new(),
            password: String::new(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }

    #[test]
    fn test_register_form_rules() {
        let form = RegisterForm {
            name: "A".to_string(),
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            password_confirmation: "1234".to_string(),
            image: None,
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "username",
                "email",
                "password",
                "password_confirmation"
            ]
        );
    }

    #[test]
    fn test_register_form_accepts_valid_input() {
        let form = RegisterForm {
            name: "Sami".to_string(),
            username: "sami".to_string(),
            email: "sami@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
            image: Some(png(100)),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_validate_comment_trims() {
        assert_eq!(validate_comment("  hi  ").unwrap(), "hi");
        assert!(validate_comment("   ").is_err());
    }
}
