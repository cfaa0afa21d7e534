use outback::{
    dispatcher::{Dispatcher, Outcomes},
    error::{DispatchError, PolicyError},
    outcome::Outcome,
    policy::{InclusionPolicy, TargetDescriptor},
    OutcomeCapability,
};
use log::info;
use std::ops::Range;

const OPENING_HOURS: Range<u8> = 9..17;
const APPOINTMENT_COST: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Booking {
    InsufficientCredits,
    SuccessfulBooking,
    FailedValidation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub patient: String,
    pub hour: u8,
}

impl BookingRequest {
    pub fn new(patient: impl Into<String>, hour: u8) -> Self {
        Self {
            patient: patient.into(),
            hour,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: u64,
    pub patient: String,
    pub hour: u8,
}

/// Mutable state of the calendar, kept apart from the capability so business
/// logic can borrow it while the capability runs the session.
#[derive(Debug, Default)]
struct Schedule {
    credits: u32,
    next_id: u64,
    appointments: Vec<Appointment>,
}

impl Schedule {
    fn validate(&self, request: &BookingRequest) -> Vec<String> {
        let mut errors = vec![];

        if request.patient.trim().is_empty() {
            errors.push("patient can't be blank".to_string());
        }
        if !OPENING_HOURS.contains(&request.hour) {
            errors.push(format!("{}:00 is outside opening hours", request.hour));
        }
        if self.appointments.iter().any(|a| a.hour == request.hour) {
            errors.push(format!("{}:00 is already taken", request.hour));
        }
        errors
    }

    fn book<R>(
        &mut self,
        request: BookingRequest,
        outcomes: &mut Outcomes<'_, '_, Booking, R>,
    ) -> Result<(), DispatchError> {
        if self.credits < APPOINTMENT_COST {
            return outcomes.trigger(Booking::InsufficientCredits, ());
        }

        let errors = self.validate(&request);
        if !errors.is_empty() {
            return outcomes.trigger(Booking::FailedValidation, (request, errors));
        }

        self.next_id += 1;
        self.credits -= APPOINTMENT_COST;

        let appointment = Appointment {
            id: self.next_id,
            patient: request.patient,
            hour: request.hour,
        };
        self.appointments.push(appointment.clone());
        info!("booked appointment {} at {}:00", appointment.id, appointment.hour);

        outcomes.trigger(Booking::SuccessfulBooking, (appointment,))
    }
}

/// Plain domain object holding the booking logic.
pub struct AppointmentCalendar {
    outcomes: OutcomeCapability,
    schedule: Schedule,
}

impl AppointmentCalendar {
    pub fn new(policy: &InclusionPolicy, credits: u32) -> Result<Self, PolicyError> {
        let target = TargetDescriptor::new("AppointmentCalendar")
            .category("service")
            .category("domain");

        Ok(Self {
            outcomes: OutcomeCapability::attach(policy, target)?,
            schedule: Schedule {
                credits,
                ..Default::default()
            },
        })
    }

    pub fn credits(&self) -> u32 {
        self.schedule.credits
    }

    /// Books an appointment, reporting one of the `Booking` outcomes to the
    /// handlers declared by `on`.
    pub fn book_appointment<'h, R>(
        &mut self,
        request: BookingRequest,
        on: impl FnOnce(&mut Dispatcher<'h, Booking, R>) -> Result<(), DispatchError>,
    ) -> Result<R, DispatchError> {
        let schedule = &mut self.schedule;
        self.outcomes
            .with_handlers(on, |outcomes| schedule.book(request, outcomes))
    }

    /// Same as `book_appointment`, handing the outcome back instead.
    pub fn book_appointment_outcome(
        &mut self,
        request: BookingRequest,
    ) -> Result<Option<Outcome<Booking>>, DispatchError> {
        let schedule = &mut self.schedule;
        self.outcomes
            .returning(|outcomes| schedule.book(request, outcomes))
    }
}

/// Request front end: turns every booking outcome into a response line.
pub fn book(
    calendar: &mut AppointmentCalendar,
    request: BookingRequest,
) -> Result<String, DispatchError> {
    calendar.book_appointment(request, |on| {
        on.of(Booking::SuccessfulBooking, |appointment: Appointment| {
            format!(
                "302 /appointments/{} ({} at {}:00)",
                appointment.id, appointment.patient, appointment.hour
            )
        })?
        .of(
            Booking::FailedValidation,
            |request: BookingRequest, errors: Vec<String>| {
                format!("422 {}: {}", request.patient, errors.join(", "))
            },
        )?
        .of(Booking::InsufficientCredits, || {
            "302 /credits/purchase".to_string()
        })?;
        Ok(())
    })
}
