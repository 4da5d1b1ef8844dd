pub mod db;
pub mod ledger;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod run_id;

use std::collections::HashMap;

// Point-in-time snapshot models consumed by the matching functions.
// The engine only reads these; persistence is the collaborator's job.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub id: i64,
    /// Qualification score (e.g. grade-point average). Absent means
    /// the candidate never reported one.
    pub qualification: Option<f64>,
    pub skills_text: String,
    /// Structured skill table: skill code -> proficiency in [0, 1].
    pub skills: HashMap<String, f64>,
    pub location_code: Option<String>,
    pub pincode: Option<String>,
    /// Declared preferences: position id -> rank (1 = first choice).
    pub preferences: HashMap<i64, i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub id: i64,
    /// Number of independent openings this position offers.
    pub capacity: u32,
    /// Minimum qualification gate; 0 disables the gate.
    pub min_qualification: f64,
    pub requirements_text: String,
    /// Structured requirement table: skill code -> weight >= 0.
    pub required_skills: HashMap<String, f64>,
    pub location_code: Option<String>,
    pub pincode: Option<String>,
}
