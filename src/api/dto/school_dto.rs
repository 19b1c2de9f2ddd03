//! School page DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::School;

/// Request body for `POST /schools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSchoolRequest {
    /// School name.
    pub name: String,
    /// Region the school belongs to; must be a known region.
    pub region_name: String,
}

/// School page representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolResponse {
    /// Page id.
    pub id: Uuid,
    /// School name.
    pub name: String,
    /// Region name.
    pub region_name: String,
    /// User ids allowed to manage the page.
    pub admins: Vec<Uuid>,
}

impl From<School> for SchoolResponse {
    fn from(school: School) -> Self {
        Self {
            id: school.id,
            name: school.name,
            region_name: school.region_name,
            admins: school.admins,
        }
    }
}
