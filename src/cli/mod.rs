use crate::domain::{
    SessionId, display_session_name, format_clock_12h, latest_message_age,
};
use crate::infra::{ConfigOverrides, FetchSessionsError, LIST_PAGE_SIZE, SessionsApi};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui {
        overrides: ConfigOverrides,
    },
    Command {
        command: CliCommand,
        overrides: ConfigOverrides,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Sessions { page: u32, per_page: u32 },
    Show { id: SessionId },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("missing session id\nHint: run `chatview sessions` and copy the id column.")]
    MissingSessionId,
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Fetch(#[from] FetchSessionsError),

    #[error("session not found: {0}\nHint: only the first 500 sessions can be looked up by id.")]
    SessionNotFound(SessionId),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Global flags are accepted before or after the subcommand.
pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut overrides = ConfigOverrides::default();
    let mut subcommand: Option<&str> = None;
    let mut positionals: Vec<&str> = Vec::new();
    let mut page: Option<u32> = None;
    let mut per_page: Option<u32> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .map(String::as_str)
                .ok_or_else(|| CliParseError::MissingFlagValue(flag.to_string()))
        };
        match arg.as_str() {
            "--api-url" => overrides.api_url = Some(value_for("--api-url")?.to_string()),
            "--assets" => overrides.assets_base = Some(value_for("--assets")?.to_string()),
            "--log-file" => overrides.log_file = Some(PathBuf::from(value_for("--log-file")?)),
            "--cell-width" => {
                let value = value_for("--cell-width")?;
                overrides.cell_width_px = Some(parse_positive_flag::<u16>("--cell-width", value)?);
            }
            "--timeout-secs" => {
                let value = value_for("--timeout-secs")?;
                overrides.timeout_secs = Some(parse_positive_flag::<u64>("--timeout-secs", value)?);
            }
            "--page" | "-p" => {
                let value = value_for("--page")?;
                page = Some(parse_positive_flag::<u32>("--page", value)?);
            }
            "--per-page" => {
                let value = value_for("--per-page")?;
                per_page = Some(parse_positive_flag::<u32>("--per-page", value)?);
            }
            other if other.starts_with('-') && other.len() > 1 && !is_negative_number(other) => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            other => {
                if subcommand.is_none() {
                    subcommand = Some(other);
                } else {
                    positionals.push(other);
                }
            }
        }
    }

    let Some(subcommand) = subcommand else {
        if let Some(flag) = page.map(|_| "--page").or(per_page.map(|_| "--per-page")) {
            return Err(CliParseError::UnknownFlag(flag.to_string()));
        }
        return Ok(CliInvocation::Tui { overrides });
    };

    let command = match subcommand {
        "sessions" => {
            if let Some(extra) = positionals.first() {
                return Err(CliParseError::UnexpectedArgument((*extra).to_string()));
            }
            CliCommand::Sessions {
                page: page.unwrap_or(1),
                per_page: per_page.unwrap_or(LIST_PAGE_SIZE),
            }
        }
        "show" => {
            if let Some(flag) = page.map(|_| "--page").or(per_page.map(|_| "--per-page")) {
                return Err(CliParseError::UnknownFlag(flag.to_string()));
            }
            let mut positionals = positionals.into_iter();
            let raw = positionals.next().ok_or(CliParseError::MissingSessionId)?;
            if let Some(extra) = positionals.next() {
                return Err(CliParseError::UnexpectedArgument(extra.to_string()));
            }
            let id = raw
                .parse::<i64>()
                .map_err(|_| CliParseError::InvalidFlagValue {
                    flag: "session id".to_string(),
                    value: raw.to_string(),
                })?;
            CliCommand::Show { id: SessionId(id) }
        }
        other => return Err(CliParseError::UnknownSubcommand(other.to_string())),
    };

    Ok(CliInvocation::Command { command, overrides })
}

fn parse_positive_flag<T>(flag: &str, value: &str) -> Result<T, CliParseError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        }),
    }
}

fn is_negative_number(arg: &str) -> bool {
    arg.len() > 1 && arg[1..].chars().all(|ch| ch.is_ascii_digit())
}

/// Runs a non-interactive subcommand, writing TSV rows to `out`.
pub fn run(
    command: CliCommand,
    api: &dyn SessionsApi,
    now: OffsetDateTime,
    local_offset: UtcOffset,
    out: &mut dyn Write,
) -> Result<(), CliRunError> {
    match command {
        CliCommand::Sessions { page, per_page } => {
            let data = api.fetch_page(page, per_page)?;
            tracing::info!(page, per_page, total_pages = data.pages, "fetched sessions page");
            for session in &data.chat_sessions {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    session.id,
                    sanitize_field(&display_session_name(&session.name)),
                    latest_message_age(&session.messages, now),
                    session.messages.len()
                )?;
            }
        }
        CliCommand::Show { id } => {
            let Some(session) = api.find_session(id)? else {
                return Err(CliRunError::SessionNotFound(id));
            };
            for message in &session.messages {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    format_clock_12h(&message.timestamp, local_offset),
                    message.action.label(),
                    sanitize_field(&message.content)
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch == '\t' || ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect()
}
