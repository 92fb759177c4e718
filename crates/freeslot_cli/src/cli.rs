use std::process;

use getopts::Options;

const DEFAULT_DB_PATH: &str = "freeslot.sqlite3";

pub struct Args {
    pub db_path: String,
    pub log_dir: Option<String>,
    pub log_level: String,
    pub command: Command,
}

pub enum Command {
    AdminAdd {
        username: String,
        password: String,
    },
    EventAdd {
        username: String,
        password: String,
        title: String,
        date: String,
        description: String,
    },
    EventRemove {
        username: String,
        password: String,
        event_id: String,
    },
    Events,
    Register {
        event_id: String,
        name: String,
        student_id: String,
        dob: String,
    },
    Toggle {
        event_id: String,
        member_key: String,
        hours: Vec<String>,
    },
    Show {
        event_id: String,
    },
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "d",
        "db",
        "SQLite database file [Default: freeslot.sqlite3]",
        "PATH",
    );
    opts.optopt(
        "",
        "log-dir",
        "Absolute directory for rolling log files [Default: logging disabled]",
        "DIR",
    );
    opts.optopt(
        "",
        "log-level",
        "trace|debug|info|warn|error [Default: debug for debug builds, info otherwise]",
        "LEVEL",
    );
    opts
}

fn usage(opts: &Options) -> String {
    let brief = format!(
        "Usage: {} [options] <command> [args]\n\n\
         Commands:\n    \
         admin-add <username> <password>\n    \
         event-add <username> <password> <title> <YYYY-MM-DD> [description]\n    \
         event-rm <username> <password> <event-id>\n    \
         events\n    \
         register <event-id> <full name> <student-id> <YYYY-MM-DD>\n    \
         toggle <event-id> <member-key> <hour>...\n    \
         show <event-id>",
        env!("CARGO_PKG_NAME")
    );
    opts.usage(&brief)
}

pub fn parse(args: Vec<String>, default_level: &str) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", usage(&opts));
        process::exit(0);
    }

    let command = match parse_command(&matches.free) {
        Some(command) => command,
        None => {
            eprintln!("{}", usage(&opts));
            process::exit(1);
        }
    };

    Args {
        db_path: matches
            .opt_str("db")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        log_dir: matches.opt_str("log-dir"),
        log_level: matches
            .opt_str("log-level")
            .unwrap_or_else(|| default_level.to_string()),
        command,
    }
}

fn parse_command(free: &[String]) -> Option<Command> {
    let (name, rest) = free.split_first()?;
    let arg = |index: usize| rest.get(index).cloned();

    let command = match (name.as_str(), rest.len()) {
        ("admin-add", 2) => Command::AdminAdd {
            username: arg(0)?,
            password: arg(1)?,
        },
        ("event-add", 4 | 5) => Command::EventAdd {
            username: arg(0)?,
            password: arg(1)?,
            title: arg(2)?,
            date: arg(3)?,
            description: arg(4).unwrap_or_default(),
        },
        ("event-rm", 3) => Command::EventRemove {
            username: arg(0)?,
            password: arg(1)?,
            event_id: arg(2)?,
        },
        ("events", 0) => Command::Events,
        ("register", 4) => Command::Register {
            event_id: arg(0)?,
            name: arg(1)?,
            student_id: arg(2)?,
            dob: arg(3)?,
        },
        ("toggle", n) if n >= 3 => Command::Toggle {
            event_id: arg(0)?,
            member_key: arg(1)?,
            hours: rest[2..].to_vec(),
        },
        ("show", 1) => Command::Show {
            event_id: arg(0)?,
        },
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};

    fn words(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_event_add_with_optional_description() {
        let command = parse_command(&words(&["event-add", "root", "pw", "Sync", "2026-10-20"]));
        assert!(matches!(
            command,
            Some(Command::EventAdd { ref description, .. }) if description.is_empty()
        ));
    }

    #[test]
    fn parses_toggle_with_many_hours() {
        let command = parse_command(&words(&["toggle", "id", "key", "8", "9"]));
        assert!(matches!(command, Some(Command::Toggle { ref hours, .. }) if hours.len() == 2));
    }

    #[test]
    fn rejects_unknown_or_short_commands() {
        assert!(parse_command(&words(&["register", "id"])).is_none());
        assert!(parse_command(&words(&["launch"])).is_none());
        assert!(parse_command(&[]).is_none());
    }
}
