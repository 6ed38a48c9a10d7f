use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::role::Role,
    models::{LoginReq, RegisterReq, TokenType, UserRow},
    utils::{code_cache, code_filter},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

/// true  => employee code AVAILABLE
/// false => employee code TAKEN
pub async fn is_code_available(code: &str, pool: &MySqlPool) -> bool {
    // 1. Cuckoo filter — fast negative: if the filter has never seen the
    //    code it is definitely free.
    if !code_filter::might_exist(code) {
        return true;
    }

    // 2. Moka cache — fast positive
    if code_cache::is_taken(code).await {
        return false;
    }

    // 3. Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_code = ? LIMIT 1)",
    )
    .bind(code_filter::normalize(code))
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

struct EmployeeProfile {
    code: String,
    name: String,
    email: String,
}

/// Creates the employee profile (when given) and the user account in one
/// transaction, then keeps the filter and cache populated.
async fn insert_account(
    username: &str,
    password: &str,
    role_id: u8,
    profile: Option<&EmployeeProfile>,
    pool: &MySqlPool,
) -> Result<(), HttpResponse> {
    let hashed = hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    let employee_id = match profile {
        Some(p) => {
            let result =
                sqlx::query("INSERT INTO employees (employee_code, name, email) VALUES (?, ?, ?)")
                    .bind(&p.code)
                    .bind(&p.name)
                    .bind(&p.email)
                    .execute(&mut *tx)
                    .await;

            match result {
                Ok(r) => Some(r.last_insert_id()),
                Err(e) if is_duplicate_key(&e) => {
                    return Err(HttpResponse::Conflict().json(json!({
                        "error": "Employee code already exists"
                    })));
                }
                Err(e) => {
                    error!(error = %e, "Failed to create employee profile");
                    return Err(HttpResponse::InternalServerError()
                        .json(json!({"error": "Failed to register user"})));
                }
            }
        }
        None => None,
    };

    let result =
        sqlx::query("INSERT INTO users (username, password, role_id, employee_id) VALUES (?, ?, ?, ?)")
            .bind(username)
            .bind(&hashed)
            .bind(role_id)
            .bind(employee_id)
            .execute(&mut *tx)
            .await;

    match result {
        Ok(_) => {}
        Err(e) if is_duplicate_key(&e) => {
            return Err(HttpResponse::Conflict().json(json!({
                "error": "Username already exists"
            })));
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return Err(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to register user"})));
        }
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit registration");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    if let Some(p) = profile {
        code_filter::insert(&p.code);
        code_cache::mark_taken(&p.code).await;
    }

    Ok(())
}

/// Registration handler. Employee accounts carry a profile; admin and HR
/// accounts are bare users.
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let username = user.username.trim();
    let password = &user.password;

    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        }));
    }

    let role = match Role::from_id(user.role_id) {
        Some(r) => r,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Unknown role"
            }));
        }
    };

    let profile = if role == Role::Employee {
        let (code, name, email) = match (
            user.employee_code.as_deref().map(str::trim),
            user.name.as_deref().map(str::trim),
            user.email.as_deref().map(str::trim),
        ) {
            (Some(c), Some(n), Some(e)) if !c.is_empty() && !n.is_empty() && !e.is_empty() => {
                (c, n, e)
            }
            _ => {
                return HttpResponse::BadRequest().json(json!({
                    "error": "employee_code, name and email are required for employee accounts"
                }));
            }
        };

        if !is_code_available(code, pool.get_ref()).await {
            return HttpResponse::Conflict().json(json!({
                "error": "Employee code already taken"
            }));
        }

        Some(EmployeeProfile {
            code: code_filter::normalize(code),
            name: name.to_string(),
            email: email.to_string(),
        })
    } else {
        None
    };

    match insert_account(username, password, user.role_id, profile.as_ref(), pool.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "Registered successfully"
        })),
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password, role_id, employee_id
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(u)) => {
            debug!(user_id = u.id, "User found");
            u
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, issuing tokens");

    let access_token = match generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (refresh_token, refresh_claims) = match generate_refresh_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // non-fatal
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some((id, user_id, false))) => (id, user_id),
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // rotate: revoke the old token before issuing a new one
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record.0)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let issued = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .and_then(|(new_refresh, new_claims)| {
        generate_access_token(
            claims.user_id,
            claims.sub.clone(),
            claims.role,
            claims.employee_id,
            &config.jwt_secret,
            config.access_token_ttl,
        )
        .map(|access| (new_refresh, new_claims, access))
    });

    let (new_refresh_token, new_claims, access_token) = match issued {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign tokens");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record.1)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    // revoke is idempotent; success even if the token never existed
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}
