//! # Booking Confirmation
//!
//! A public booking is re-validated and written inside one day transaction:
//!
//! 1. Resolve the free slots for the requested date and duration.
//! 2. Reject with `slot_unavailable` unless the requested time is one of them.
//! 3. Link the session to an active student whose parent e-mail matches,
//!    otherwise keep the booker's contact details on the session.
//! 4. Insert with the rate frozen from the tutor's current hourly rate.
//!
//! The transaction holds the `(tutor, date)` lock throughout, so a second
//! confirmation for the same slot sees the first one's session and is turned
//! away. A serialization failure or deadlock re-runs the whole attempt once.
//! The notification is queued only after commit and never awaited.

use tutorbook_core::{
    errors::{BookingRejection, TutorError, TutorResult},
    models::{
        booking::{BookingConfirmation, BookingForm, BookingRequest, TutorSummary},
        session::{rate_for, Attendee, NewSession, Session, SessionType},
        tutor::Tutor,
    },
    slots::resolve_slots,
};
use tutorbook_db::{is_retryable, is_unique_violation, InsertOutcome, SchedulingStore};
use tutorbook_mailer::{BookingNotice, Notifier};

pub async fn confirm_booking(
    store: &dyn SchedulingStore,
    notifier: &dyn Notifier,
    tutor: &Tutor,
    form: BookingForm,
) -> TutorResult<BookingConfirmation> {
    let request = BookingRequest::try_from(form)?;

    let session = match book_once(store, tutor, &request).await {
        Err(TutorError::Database(err)) if is_retryable(&err) => {
            tracing::warn!(
                "Retrying booking for tutor {} at {}: {}",
                tutor.id,
                request.scheduled_at(),
                err
            );
            book_once(store, tutor, &request).await?
        }
        result => result?,
    };

    tracing::info!(
        "Booked session {} for tutor {} at {}",
        session.id,
        tutor.id,
        session.scheduled_at
    );

    notifier.notify_booking(BookingNotice {
        tutor_name: tutor.full_name.clone(),
        tutor_email: tutor.email.clone(),
        student_name: request.contact.name.clone(),
        student_email: request.contact.email.clone(),
        scheduled_at: session.scheduled_at,
        duration_minutes: session.duration_minutes,
        session_type: session.session_type,
        subject: request.contact.subject.clone(),
        meeting_link: session.meeting_link.clone(),
    });

    Ok(BookingConfirmation {
        tutor: TutorSummary {
            id: tutor.id,
            full_name: tutor.full_name.clone(),
            profile_slug: tutor.profile_slug.clone(),
        },
        session,
        student_name: request.contact.name,
    })
}

async fn book_once(
    store: &dyn SchedulingStore,
    tutor: &Tutor,
    request: &BookingRequest,
) -> TutorResult<Session> {
    // Dropping `tx` on any early return rolls back and releases the day lock.
    let mut tx = store.begin_day(tutor.id, request.date).await?;

    let windows = tx.active_windows().await?;
    let exclusions = tx.find_overlapping().await?;
    let slots = resolve_slots(request.date, &windows, &exclusions, request.duration_minutes);
    if !slots.contains(&request.time) {
        return Err(BookingRejection::SlotUnavailable.into());
    }

    let email = request.contact.email.trim();
    let student = if email.is_empty() {
        None
    } else {
        tx.find_active_student_by_email(email).await?
    };
    let attendee = match student {
        Some(student) => Attendee::Student {
            student_id: student.id,
        },
        None => Attendee::Guest(request.contact.clone()),
    };

    let new_session = NewSession {
        tutor_id: tutor.id,
        attendee,
        scheduled_at: request.scheduled_at(),
        duration_minutes: request.duration_minutes,
        session_type: request.session_type,
        meeting_link: match request.session_type {
            SessionType::Online => tutor.default_meeting_link.clone(),
            SessionType::InPerson => String::new(),
        },
        location: match request.session_type {
            SessionType::Online => String::new(),
            SessionType::InPerson => tutor.address.clone(),
        },
        rate_charged: rate_for(tutor.hourly_rate, request.duration_minutes),
    };

    match tx.insert_session(new_session).await? {
        InsertOutcome::Created(session) => match tx.commit().await {
            Ok(()) => Ok(session),
            Err(err) if is_unique_violation(&err) => Err(BookingRejection::SlotUnavailable.into()),
            Err(err) => Err(err.into()),
        },
        InsertOutcome::SlotTaken => Err(BookingRejection::SlotUnavailable.into()),
    }
}
