mod calendar;

use anyhow::{bail, Context};
use calendar::{AppointmentCalendar, BookingRequest};
use outback::policy::InclusionPolicy;

const STARTING_CREDITS: u32 = 3;

/// Parses `<patient>@<hour>` arguments.
fn parse_request(arg: &str) -> anyhow::Result<BookingRequest> {
    let Some((patient, hour)) = arg.split_once('@') else {
        bail!("expected <patient>@<hour>, got {:?}", arg)
    };
    let hour = hour
        .parse()
        .with_context(|| format!("invalid hour in {:?}", arg))?;

    Ok(BookingRequest::new(patient, hour))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let policy = InclusionPolicy::from_env()?;
    let mut appointments = AppointmentCalendar::new(&policy, STARTING_CREDITS)?;

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    // `--outcome` prints the raw outcome of every booking instead of a response.
    let outcome_only = args.first().map_or(false, |a| a == "--outcome");
    if outcome_only {
        args.remove(0);
    }
    if args.is_empty() {
        args = ["john@10", "jane@10", "@20", "jim@11", "joe@12", "jack@13"]
            .iter()
            .map(|a| a.to_string())
            .collect();
    }

    for arg in args {
        let request = parse_request(&arg)?;
        if outcome_only {
            let outcome = appointments.book_appointment_outcome(request)?;
            println!("{} -> {:?}", arg, outcome);
        } else {
            println!("{} -> {}", arg, calendar::book(&mut appointments, request)?);
        }
    }
    println!("credits left: {}", appointments.credits());

    Ok(())
}
