use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    session::{Session, SessionStatus},
    student::Student,
};

pub const RECENT_PAID_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentBalance {
    pub student_id: Uuid,
    pub student_name: String,
    pub session_ids: Vec<Uuid>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsOverview {
    pub unpaid: Vec<Session>,
    pub recent_paid: Vec<Session>,
    pub student_balances: Vec<StudentBalance>,
    pub outstanding_total: f64,
}

impl PaymentsOverview {
    /// Builds the tutor's payment picture. Only completed, unpaid sessions are
    /// owed; cancelled sessions never count toward any total.
    pub fn build(sessions: &[Session], active_students: &[Student]) -> Self {
        let mut unpaid: Vec<Session> = sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed && !s.is_paid)
            .cloned()
            .collect();
        unpaid.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));

        let mut recent_paid: Vec<Session> = sessions
            .iter()
            .filter(|s| s.is_paid && s.status != SessionStatus::Cancelled)
            .cloned()
            .collect();
        recent_paid.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        recent_paid.truncate(RECENT_PAID_LIMIT);

        let mut owed_by_student: HashMap<Uuid, Vec<&Session>> = HashMap::new();
        for session in &unpaid {
            if let Some(student_id) = session.attendee.student_id() {
                owed_by_student.entry(student_id).or_default().push(session);
            }
        }

        let mut student_balances: Vec<StudentBalance> = active_students
            .iter()
            .filter_map(|student| {
                let owed = owed_by_student.get(&student.id)?;
                Some(StudentBalance {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    session_ids: owed.iter().map(|s| s.id).collect(),
                    total: round_cents(owed.iter().map(|s| s.rate_charged).sum()),
                })
            })
            .collect();
        student_balances.sort_by(|a, b| a.student_name.cmp(&b.student_name));

        let outstanding_total = round_cents(unpaid.iter().map(|s| s.rate_charged).sum());

        Self {
            unpaid,
            recent_paid,
            student_balances,
            outstanding_total,
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
