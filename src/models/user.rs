use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated account. Rows are provisioned out of band;
/// the service only reads them to resolve the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
