use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "user_id": 1,
        "name": "John Doe",
        "employee_code": "EMP-0001",
        "department": "Engineering",
        "email": "john.doe@company.com",
        "role": "employee"
    })
)]
pub struct Profile {
    #[schema(example = 1)]
    pub user_id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "EMP-0001")]
    pub employee_code: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "employee")]
    pub role: String,
}
