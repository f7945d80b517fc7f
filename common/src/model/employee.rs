use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Id of the employee this one reports to.
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One node of the organisational chart built from `manager_id` links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgChartNode {
    pub employee_id: String,
    pub full_name: String,
    pub job_role: Option<String>,
    pub reports: Vec<OrgChartNode>,
}
