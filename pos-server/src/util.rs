//! Shared utility functions for pos-server

use rand::Rng;
use sha2::{Digest, Sha256};
use shared::error::AppError;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 32 random bytes, hex encoded. Shown to the client once, never stored.
pub fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// SHA-256 digest of a refresh token (the only form persisted)
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Distinct invoice codes available per calendar year
pub const INVOICE_CODES_PER_YEAR: u32 = 10_000;

/// `INV-<year>-<0000..9999>`
pub fn generate_invoice_code(year: i32) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..INVOICE_CODES_PER_YEAR);
    format!("INV-{year}-{n:04}")
}

/// Map `validator` errors to a 400 with one detail entry per offending
/// field. Nested fields are keyed by path, e.g. `items[1].qty`.
pub fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let mut fields = Vec::new();
    flatten_errors("", &errors, &mut fields);
    fields.sort();

    let mut err = AppError::validation("Validation failed");
    for (field, reason) in fields {
        err = err.with_detail(field, reason);
    }
    err
}

fn flatten_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<(String, String)>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let reasons: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                out.push((path, reasons.join(", ")));
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(&path, inner, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    flatten_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn test_refresh_token_shape() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = generate_refresh_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[test]
    fn test_invoice_code_format() {
        for _ in 0..100 {
            let code = generate_invoice_code(2025);
            assert_eq!(code.len(), "INV-2025-0000".len());
            assert!(code.starts_with("INV-2025-"));
            assert!(code[9..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_validation_error_lists_fields() {
        use validator::Validate;

        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 2))]
            name: String,
            #[validate(email)]
            email: String,
        }

        let errors = Payload {
            name: "a".into(),
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();
        let err = validation_error(errors);
        let details = err.details.unwrap();
        assert!(details.contains_key("name"));
        assert!(details.contains_key("email"));
    }

    #[test]
    fn test_validation_error_paths_into_lists() {
        use validator::Validate;

        #[derive(Validate)]
        struct Line {
            #[validate(range(min = 1))]
            qty: i16,
        }

        #[derive(Validate)]
        struct Order {
            #[validate(nested)]
            items: Vec<Line>,
        }

        let errors = Order {
            items: vec![Line { qty: 1 }, Line { qty: 0 }],
        }
        .validate()
        .unwrap_err();
        let details = validation_error(errors).details.unwrap();
        assert_eq!(details.len(), 1);
        assert!(details.contains_key("items[1].qty"));
    }
}
