use serde::{Deserialize, Serialize};
use tutorbook_core::models::session::SessionType;

use crate::notice::BookingNotice;

const DATE_FORMAT: &str = "%A, %B %d, %Y";
const TIME_FORMAT: &str = "%I:%M %p";

/// One rendered message, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// The tutor notification, then the student confirmation when there is an address.
pub fn render(notice: &BookingNotice) -> Vec<Email> {
    let mut emails = vec![tutor_notification(notice)];
    emails.extend(student_confirmation(notice));
    emails
}

pub fn tutor_notification(notice: &BookingNotice) -> Email {
    let date = notice.scheduled_at.format(DATE_FORMAT).to_string();
    let rows = [
        detail_row("Student", &notice.student_name, true),
        detail_row("Email", &notice.student_email, false),
        session_rows(notice),
    ]
    .concat();

    let body = format!(
        r#"<p style="color: #374151; font-size: 16px;">Hi {tutor},</p>
        <p style="color: #374151;">A new tutoring session has been booked:</p>
        <table style="width: 100%; border-collapse: collapse; margin: 16px 0;">{rows}</table>
        <p style="color: #6B7280; font-size: 14px;">Check your TutorBook dashboard for full details.</p>"#,
        tutor = escape(&notice.tutor_name),
    );

    Email {
        to: notice.tutor_email.clone(),
        subject: format!("New Booking: {} on {}", notice.student_name, date),
        html: layout("New Session Booked!", &body),
    }
}

pub fn student_confirmation(notice: &BookingNotice) -> Option<Email> {
    let to = notice.student_email.trim();
    if to.is_empty() {
        return None;
    }

    let tutor = escape(&notice.tutor_name);
    let meeting = match notice.session_type {
        SessionType::Online if !notice.meeting_link.is_empty() => {
            let link = escape(&notice.meeting_link);
            format!(
                r#"<div style="background: #EEF2FF; border: 1px solid #C7D2FE; border-radius: 8px; padding: 16px; margin: 16px 0;">
            <p style="color: #4F46E5; font-weight: 600; margin: 0 0 8px 0;">Meeting Link</p>
            <a href="{link}" style="color: #4F46E5; word-break: break-all;">{link}</a>
            <p style="color: #6B7280; font-size: 13px; margin: 8px 0 0 0;">Please join 5 minutes before your session starts.</p>
        </div>"#
            )
        }
        _ => String::new(),
    };

    let body = format!(
        r#"<p style="color: #374151; font-size: 16px;">Hi {student},</p>
        <p style="color: #374151;">Your tutoring session with <strong>{tutor}</strong> is confirmed:</p>
        <table style="width: 100%; border-collapse: collapse; margin: 16px 0;">{rows}</table>
        {meeting}
        <p style="color: #6B7280; font-size: 14px;">If you need to reschedule, please contact {tutor} directly.</p>"#,
        student = escape(&notice.student_name),
        rows = session_rows(notice),
    );

    Some(Email {
        to: to.to_string(),
        subject: format!("Session Confirmed with {}", notice.tutor_name),
        html: layout("Session Confirmed!", &body),
    })
}

fn session_rows(notice: &BookingNotice) -> String {
    let mut rows = [
        detail_row("Date", &notice.scheduled_at.format(DATE_FORMAT).to_string(), true),
        detail_row("Time", &notice.scheduled_at.format(TIME_FORMAT).to_string(), true),
        detail_row("Duration", &format!("{} minutes", notice.duration_minutes), false),
        detail_row("Type", notice.session_type.label(), false),
    ]
    .concat();
    if !notice.subject.is_empty() {
        rows.push_str(&detail_row("Subject", &notice.subject, false));
    }
    rows
}

fn detail_row(label: &str, value: &str, strong: bool) -> String {
    let weight = if strong { " font-weight: 600;" } else { "" };
    format!(
        r#"<tr><td style="padding: 8px 0; color: #6B7280; width: 140px;">{label}</td><td style="padding: 8px 0; color: #111827;{weight}">{value}</td></tr>"#,
        value = escape(value),
    )
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <div style="background: #4F46E5; color: white; padding: 24px; border-radius: 8px 8px 0 0;">
        <h1 style="margin: 0; font-size: 22px;">{heading}</h1>
    </div>
    <div style="background: #ffffff; padding: 24px; border: 1px solid #E5E7EB; border-top: none; border-radius: 0 0 8px 8px;">
        {body}
    </div>
</div>"#
    )
}

/// Booker-supplied text lands inside HTML.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn notice(session_type: SessionType) -> BookingNotice {
        BookingNotice {
            tutor_name: "Ada Lovelace".into(),
            tutor_email: "ada@example.com".into(),
            student_name: "Sam".into(),
            student_email: "parent@example.com".into(),
            scheduled_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            duration_minutes: 60,
            session_type,
            subject: "Algebra".into(),
            meeting_link: "https://meet.example.com/ada".into(),
        }
    }

    #[test]
    fn test_tutor_notification() {
        let email = tutor_notification(&notice(SessionType::Online));

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "New Booking: Sam on Monday, January 01, 2024");
        assert!(email.html.contains("02:30 PM"));
        assert!(email.html.contains("60 minutes"));
        assert!(email.html.contains("Algebra"));
        assert!(!email.html.contains("Meeting Link"));
    }

    #[test]
    fn test_online_confirmation_carries_meeting_link() {
        let email = student_confirmation(&notice(SessionType::Online)).unwrap();

        assert_eq!(email.subject, "Session Confirmed with Ada Lovelace");
        assert!(email.html.contains("https://meet.example.com/ada"));
        assert!(email.html.contains("Online"));
    }

    #[test]
    fn test_in_person_confirmation_has_no_meeting_link() {
        let email = student_confirmation(&notice(SessionType::InPerson)).unwrap();

        assert!(!email.html.contains("Meeting Link"));
        assert!(email.html.contains("In-Person"));
    }

    #[test]
    fn test_no_student_address_means_one_email() {
        let mut notice = notice(SessionType::Online);
        notice.student_email = "  ".into();

        assert_eq!(student_confirmation(&notice), None);
        assert_eq!(render(&notice).len(), 1);
    }

    #[test]
    fn test_booker_text_is_escaped() {
        let mut notice = notice(SessionType::InPerson);
        notice.student_name = "<script>alert('x')</script>".into();

        let email = tutor_notification(&notice);
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }
}
