use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub subjects: Vec<String>,
    pub hourly_rate: f64,
    pub currency: String,
    pub timezone: String,
    pub phone: String,
    pub address: String,
    pub profile_slug: String,
    pub session_durations: Vec<i32>,
    pub default_meeting_link: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTutorRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub profile_slug: String,
    #[serde(default)]
    pub hourly_rate: f64,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub tutor: Tutor,
}

/// Fields the store needs to insert a tutor row; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTutor {
    pub email: String,
    pub full_name: String,
    pub profile_slug: String,
    pub hourly_rate: f64,
    pub timezone: String,
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub session_durations: Option<Vec<i32>>,
    pub default_meeting_link: Option<String>,
}

impl TutorProfileUpdate {
    pub fn apply_to(self, tutor: &mut Tutor) {
        if let Some(full_name) = self.full_name {
            tutor.full_name = full_name.trim().to_string();
        }
        if let Some(bio) = self.bio {
            tutor.bio = bio;
        }
        if let Some(subjects) = self.subjects {
            tutor.subjects = subjects
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(rate) = self.hourly_rate {
            tutor.hourly_rate = rate;
        }
        if let Some(currency) = self.currency {
            tutor.currency = currency;
        }
        if let Some(timezone) = self.timezone {
            tutor.timezone = timezone;
        }
        if let Some(phone) = self.phone {
            tutor.phone = phone;
        }
        if let Some(address) = self.address {
            tutor.address = address;
        }
        if let Some(mut durations) = self.session_durations {
            durations.retain(|d| *d > 0);
            durations.sort_unstable();
            durations.dedup();
            tutor.session_durations = durations;
        }
        if let Some(link) = self.default_meeting_link {
            tutor.default_meeting_link = link;
        }
    }
}

/// What a parent sees before booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub bio: String,
    pub subjects: Vec<String>,
    pub hourly_rate: f64,
    pub currency: String,
    pub session_durations: Vec<i32>,
    pub availability: Vec<String>,
    pub dates: Vec<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tutor() -> Tutor {
        Tutor {
            id: Uuid::new_v4(),
            email: "t@example.com".into(),
            full_name: "Ada".into(),
            bio: String::new(),
            subjects: vec![],
            hourly_rate: 40.0,
            currency: DEFAULT_CURRENCY.into(),
            timezone: DEFAULT_TIMEZONE.into(),
            phone: String::new(),
            address: String::new(),
            profile_slug: "ada".into(),
            session_durations: vec![60],
            default_meeting_link: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn profile_update_cleans_lists() {
        let mut t = tutor();
        TutorProfileUpdate {
            subjects: Some(vec![" Math ".into(), "".into(), "Physics".into()]),
            session_durations: Some(vec![90, 0, 45, 90]),
            hourly_rate: Some(55.0),
            ..Default::default()
        }
        .apply_to(&mut t);

        assert_eq!(t.subjects, vec!["Math".to_string(), "Physics".to_string()]);
        assert_eq!(t.session_durations, vec![45, 90]);
        assert_eq!(t.hourly_rate, 55.0);
        assert_eq!(t.full_name, "Ada");
    }
}
