//! Fact checks of claims about an event.
//!
//! Only staff accounts may be recorded as verifiers. Setting the verifiers
//! is all-or-nothing: one non-staff user rejects the whole list.

use crate::db::error::{StoreError, StoreResult};
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::db::users::Users;
use crate::libs::choices::text_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_FACT_CHECK: &str =
    "INSERT INTO fact_checks (claim, verification_status, notes, checked_at, event_id) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_FACT_CHECK: &str = "UPDATE fact_checks SET
    claim = ?1, verification_status = ?2, notes = ?3, checked_at = ?4, event_id = ?5
    WHERE id = ?6";
const SELECT_FACT_CHECKS: &str = "SELECT id, claim, verification_status, notes, checked_at, event_id FROM fact_checks";

const VERIFIED_BY: Link = Link::new("fact_check_verifiers", "fact_check_id", "user_id");

text_choices! {
    pub enum VerificationStatus {
        Pending = "PENDING" => "Pending",
        Verified = "VERIFIED" => "Verified",
        Disputed = "DISPUTED" => "Disputed",
        Refuted = "REFUTED" => "Refuted",
    }
}

/// Verification of a single claim made about an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheck {
    pub id: Option<i64>,
    /// The statement under review.
    pub claim: String,
    pub verification_status: VerificationStatus,
    pub notes: String,
    /// Defaults to the moment the check is built.
    pub checked_at: DateTime<Utc>,
    /// Event the claim is about. Checks go away with the event.
    pub event_id: i64,
}

impl FactCheck {
    /// New, pending fact check.
    pub fn new(event_id: i64, claim: &str) -> Self {
        Self {
            id: None,
            claim: claim.to_string(),
            verification_status: VerificationStatus::Pending,
            notes: String::new(),
            checked_at: Utc::now(),
            event_id,
        }
    }
}

impl Validate for FactCheck {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("claim", &self.claim);
        v.finish()
    }
}

fn fact_check_from_row(row: &Row) -> rusqlite::Result<FactCheck> {
    Ok(FactCheck {
        id: row.get(0)?,
        claim: row.get(1)?,
        verification_status: row.get(2)?,
        notes: row.get(3)?,
        checked_at: row.get(4)?,
        event_id: row.get(5)?,
    })
}

pub struct FactChecks<'a> {
    conn: &'a Connection,
}

impl<'a> FactChecks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, fact_check: &mut FactCheck) -> StoreResult<i64> {
        fact_check.validate()?;
        save_row(
            self.conn,
            "fact check",
            &mut fact_check.id,
            INSERT_FACT_CHECK,
            UPDATE_FACT_CHECK,
            params![
                fact_check.claim,
                fact_check.verification_status,
                fact_check.notes,
                fact_check.checked_at,
                fact_check.event_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<FactCheck> {
        require(self.conn, "fact check", id, &format!("{} WHERE id = ?1", SELECT_FACT_CHECKS), [id], fact_check_from_row)
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<FactCheck>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE event_id = ?1 ORDER BY checked_at, id", SELECT_FACT_CHECKS),
            [event_id],
            fact_check_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "fact_checks", "fact check", id)
    }

    /// Replaces the verifiers of a fact check. Every user must be staff.
    pub fn set_verifiers(&self, fact_check_id: i64, user_ids: &[i64]) -> StoreResult<()> {
        let users = Users::new(self.conn);
        let mut v = Validator::new();
        for &user_id in user_ids {
            let user = users.get(user_id)?;
            if !user.is_staff {
                v.add("verified_by", format!("{} is not a staff member.", user.email));
            }
        }
        v.finish().map_err(StoreError::from)?;
        VERIFIED_BY.set(self.conn, fact_check_id, user_ids)
    }

    /// Adds one staff verifier.
    pub fn add_verifier(&self, fact_check_id: i64, user_id: i64) -> StoreResult<()> {
        let user = Users::new(self.conn).get(user_id)?;
        if !user.is_staff {
            return Err(ValidationErrors::single("verified_by", format!("{} is not a staff member.", user.email)).into());
        }
        VERIFIED_BY.add(self.conn, fact_check_id, user_id)
    }

    pub fn verifiers(&self, fact_check_id: i64) -> StoreResult<Vec<i64>> {
        VERIFIED_BY.right_ids(self.conn, fact_check_id)
    }
}
