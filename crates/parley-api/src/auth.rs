use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::{info, warn};
use uuid::Uuid;

use parley_db::Database;
use parley_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, present, public_user, run_blocking};

/// Session tokens are valid for 24 hours from issuance.
pub const TOKEN_TTL_HOURS: i64 = 24;

const MISSING_FIELDS: &str = "Please fill all required fields";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    run_blocking(&state, move |s| register_user(&s.db, &req)).await?;
    Ok("User registered successfully")
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let resp = run_blocking(&state, move |s| login_user(&s.db, &s.jwt_secret, &req)).await?;
    Ok(Json(resp))
}

/// Create an account. The email lookup and the insert are separate store
/// operations; the unique email index settles a race between them.
pub fn register_user(db: &Database, req: &RegisterRequest) -> ApiResult<()> {
    let (Some(full_name), Some(email), Some(password)) =
        (present(&req.full_name), present(&req.email), present(&req.password))
    else {
        return Err(ApiError::Validation(MISSING_FIELDS));
    };

    if db.get_user_by_email(email)?.is_some() {
        return Err(ApiError::Conflict);
    }

    let password_hash = hash_password(password)?;

    let user_id = db
        .create_user(full_name, email, &password_hash)?
        .ok_or(ApiError::Conflict)?;

    info!("Registered user {}", user_id);
    Ok(())
}

/// Verify credentials and issue a fresh session token, replacing the one
/// stored on the user.
pub fn login_user(db: &Database, secret: &str, req: &LoginRequest) -> ApiResult<LoginResponse> {
    let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
        return Err(ApiError::Validation(MISSING_FIELDS));
    };

    let user = db
        .get_user_by_email(email)?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash for user {}: {}", user.id, e)))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Failed login for user {}", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(secret, &user.id, &user.email)?;

    if !db.set_user_token(&user.id, &token)? {
        return Err(ApiError::Internal(format!("user {} vanished during login", user.id)));
    }

    info!("User {} logged in", user.id);
    Ok(LoginResponse {
        user: public_user(user),
        token,
    })
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?
        .to_string();
    Ok(hash)
}

pub fn create_token(secret: &str, user_id: &str, email: &str) -> ApiResult<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
}

/// Check signature and expiry. Does not consult the store.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn register_req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn second_registration_conflicts() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &register_req("Ada", "ada@example.com", "hunter22")).unwrap();

        let err = register_user(&db, &register_req("Ada Two", "ada@example.com", "other")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict));
    }

    #[test]
    fn password_is_stored_hashed() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &register_req("Ada", "ada@example.com", "hunter22")).unwrap();

        let row = db.get_user_by_email("ada@example.com").unwrap().unwrap();
        assert_ne!(row.password, "hunter22");
        assert!(row.password.starts_with("$argon2"));
    }

    #[test]
    fn missing_or_blank_fields_fail_validation() {
        let db = Database::open_in_memory().unwrap();
        let mut req = register_req("Ada", "ada@example.com", "hunter22");
        req.password = None;
        assert!(matches!(register_user(&db, &req), Err(ApiError::Validation(_))));

        let req = register_req("  ", "ada@example.com", "hunter22");
        assert!(matches!(register_user(&db, &req), Err(ApiError::Validation(_))));

        let req = LoginRequest { email: Some("ada@example.com".into()), password: None };
        assert!(matches!(login_user(&db, SECRET, &req), Err(ApiError::Validation(_))));
    }

    #[test]
    fn login_issues_verifiable_token() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &register_req("Ada", "ada@example.com", "hunter22")).unwrap();

        let resp = login_user(&db, SECRET, &login_req("ada@example.com", "hunter22")).unwrap();
        assert_eq!(resp.user.email, "ada@example.com");
        assert_eq!(resp.user.full_name, "Ada");

        let claims = verify_token(SECRET, &resp.token).unwrap();
        assert_eq!(claims.sub, resp.user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);

        let now = chrono::Utc::now().timestamp() as usize;
        assert!(claims.exp > now + 23 * 60 * 60);

        assert!(verify_token("another-secret", &resp.token).is_err());
    }

    #[test]
    fn login_overwrites_stored_token() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &register_req("Ada", "ada@example.com", "hunter22")).unwrap();

        let resp = login_user(&db, SECRET, &login_req("ada@example.com", "hunter22")).unwrap();
        let row = db.get_user_by_id(&resp.user.id).unwrap().unwrap();
        assert_eq!(row.token.as_deref(), Some(resp.token.as_str()));
    }

    #[test]
    fn bad_credentials_are_indistinguishable() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &register_req("Ada", "ada@example.com", "hunter22")).unwrap();

        let wrong_password = login_user(&db, SECRET, &login_req("ada@example.com", "nope")).unwrap_err();
        let unknown_user = login_user(&db, SECRET, &login_req("bob@example.com", "hunter22")).unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_user, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}
