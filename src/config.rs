use std::{env, path::PathBuf};

use anyhow::{bail, Context, Error};
use chrono_tz::Tz;

use crate::event_ledger::timing::parse_time_zone;

const DEFAULT_OUTPUT: &str = "./event_summaries.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub output_path: PathBuf,
    pub default_time_zone: Tz,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let args: Vec<String> = env::args().collect();
        let time_zone = env::var("SHIFT_LEDGER_TZ").ok();
        let log_format = env::var("LOG_FORMAT").ok();

        Self::from_parts(&args, time_zone.as_deref(), log_format.as_deref())
    }

    pub fn from_parts(
        args: &[String],
        time_zone: Option<&str>,
        log_format: Option<&str>,
    ) -> Result<Self, Error> {
        let Some(snapshot) = args.get(1) else {
            bail!("usage: shift_ledger <snapshot.json> [output.json]");
        };
        let output = args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);

        let default_time_zone = match time_zone {
            Some(name) if !name.trim().is_empty() => {
                parse_time_zone(name).context("SHIFT_LEDGER_TZ is not a valid time zone")?
            }
            _ => Tz::UTC,
        };

        let log_format = match log_format.map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            snapshot_path: PathBuf::from(snapshot),
            output_path: PathBuf::from(output),
            default_time_zone,
            log_format,
        })
    }
}
