//! Command-line driver for the freeslot scheduling core.
//!
//! Opens the database, wires the event store and member registry, runs one
//! command and prints the result.

mod cli;

use cli::{Args, Command};
use freeslot_core::db::open_db;
use freeslot_core::{
    default_log_level, init_logging, AdminCredential, EventId, EventStore, MemberKey,
    MemberRegistry, NewEvent, PasswordAdminGate, RegistrationCandidate,
    SqliteAdminAccountRepository, SqliteEventRepository, SqliteMemberRepository, SyncHub,
    SystemClock,
};
use log::error;
use std::error::Error;
use std::process;
use std::sync::Arc;

fn main() {
    let args = cli::parse(std::env::args().skip(1).collect(), default_log_level());

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(err) = init_logging(&args.log_level, log_dir) {
            eprintln!("{err}");
            process::exit(1);
        }
    }

    if let Err(err) = run(args) {
        error!("event=cli_command module=cli status=error error={err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&args.db_path)?;
    let clock = Arc::new(SystemClock);
    let sync = SyncHub::in_process();

    let gate = PasswordAdminGate::new(SqliteAdminAccountRepository::new(&conn));
    let registry = MemberRegistry::new(
        SqliteMemberRepository::new(&conn),
        clock.clone(),
        sync.members.clone(),
    );

    match args.command {
        Command::AdminAdd { username, password } => {
            gate.provision(&username, &password)?;
            println!("admin account `{}` saved", username.trim());
        }
        Command::EventAdd {
            username,
            password,
            title,
            date,
            description,
        } => {
            let store = EventStore::new(SqliteEventRepository::new(&conn), gate, clock, sync);
            let event = store.create(
                &NewEvent::new(title, description, date),
                &AdminCredential::new(username, password),
            )?;
            println!("{}", event.id);
        }
        Command::EventRemove {
            username,
            password,
            event_id,
        } => {
            let store = EventStore::new(SqliteEventRepository::new(&conn), gate, clock, sync);
            let event = store.remove(
                parse_event_id(&event_id)?,
                &AdminCredential::new(username, password),
            )?;
            println!("removed {} ({})", event.id, event.title);
        }
        Command::Events => {
            let store = EventStore::new(SqliteEventRepository::new(&conn), gate, clock, sync);
            for event in store.list()? {
                println!("{}  {}  {}", event.id, event.date, event.title);
                if !event.description.is_empty() {
                    println!("    {}", event.description);
                }
            }
        }
        Command::Register {
            event_id,
            name,
            student_id,
            dob,
        } => {
            let stored = registry.register(
                parse_event_id(&event_id)?,
                &RegistrationCandidate::new(name, student_id, dob),
            )?;
            println!("{}", stored.key);
        }
        Command::Toggle {
            event_id,
            member_key,
            hours,
        } => {
            let event_id = parse_event_id(&event_id)?;
            let key = MemberKey::from_raw(member_key);
            for hour in hours {
                let hour: usize = hour
                    .parse()
                    .map_err(|_| format!("hour must be a number in 0..24, got `{hour}`"))?;
                let stored = registry.toggle_slot(event_id, &key, hour)?;
                let state = if stored.member.slots.get(hour) == Some(true) {
                    "available"
                } else {
                    "busy"
                };
                println!("{hour}:00 - {hour}:59 {state}");
            }
        }
        Command::Show { event_id } => {
            let event_id = parse_event_id(&event_id)?;
            let store = EventStore::new(SqliteEventRepository::new(&conn), gate, clock, sync);
            let event = store.get(event_id)?;
            println!("{} ({})", event.title, event.date);

            for stored in registry.members(event_id)? {
                let hours: Vec<String> = stored
                    .member
                    .slots
                    .available_hours()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!(
                    "  {:<12} {}  [{}]",
                    stored.member.short_name(),
                    stored.member.masked_student_id(),
                    hours.join(" ")
                );
            }
            println!("{}", registry.common_availability(event_id)?);
        }
    }
    Ok(())
}

fn parse_event_id(value: &str) -> Result<EventId, String> {
    EventId::parse_str(value.trim()).map_err(|_| format!("invalid event id `{value}`"))
}
