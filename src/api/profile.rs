use crate::{
    auth::auth::AuthUser,
    model::profile::Profile,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Profile fields a user may edit about themselves.
const SELF_UPDATABLE: &[&str] = &["name", "department"];

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileListResponse {
    pub data: Vec<Profile>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Get own profile
#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 404, description = "Profile not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn my_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT user_id, name, employee_code, department, email, role
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Profile not found"
        }))),
    }
}

/// Update own profile (name and department only)
#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated successfully"),
        (status = 400, description = "Invalid or non-updatable field"),
        (status = 404, description = "Profile not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn update_my_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let update = build_update_sql(
        "profiles",
        &body,
        SELF_UPDATABLE,
        "user_id",
        auth.user_id as i64,
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Profile not found"));
    }

    Ok(HttpResponse::Ok().body("Profile updated successfully"))
}

/// List profiles (manager only)
#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("department", Query, description = "Filter by department"),
        ("search", Query, description = "Search by name, email or employee code")
    ),
    responses(
        (status = 200, description = "Paginated profile list", body = ProfileListResponse),
        (status = 403, description = "Forbidden"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn list_profiles(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ProfileQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(name LIKE ? OR email LIKE ? OR employee_code LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM profiles {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting profiles");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count profiles");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT user_id, name, employee_code, department, email, role FROM profiles {} ORDER BY name ASC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching profiles");

    let mut data_query = sqlx::query_as::<_, Profile>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let profiles = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch profiles");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(ProfileListResponse {
        data: profiles,
        page,
        per_page,
        total,
    }))
}

/// Get profile by user id (manager only)
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile found", body = Profile),
        (status = 404, description = "Profile not found"),
        (status = 403, description = "Forbidden"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let user_id = path.into_inner();

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT user_id, name, employee_code, department, email, role
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch profile");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Profile not found"
        }))),
    }
}
