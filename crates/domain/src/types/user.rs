//! User directory types

use serde::{Deserialize, Serialize};

/// Directory projection of an employee
///
/// Resolved from the user directory by id. `monthly_salary` is
/// compensation data: it feeds the privileged cost views only and must
/// never cross into a safe view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub monthly_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}
