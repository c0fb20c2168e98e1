//! Shared constants for event extraction and output.
//!
//! Line patterns are compiled once at first use and shared by every
//! recording in a batch.

use std::sync::LazyLock;

use regex::Regex;

/// Column names of the uniform output table, in order.
pub const OUTPUT_HEADER: [&str; 6] = [
    "Timestamp",
    "EventKey",
    "Duration",
    "Param1",
    "Param2",
    "Param3",
];

pub const DEFAULT_TIMESTAMP: &str = "00:00:00.00";
pub const DEFAULT_EVENT_KEY: &str = "error";
pub const DEFAULT_DURATION: i64 = -1;
pub const DEFAULT_PARAM: i64 = 0;

/// Prefix marking an event key that has no entry in the mapping table.
pub const MISC_PREFIX: &str = "misc:";

/// Prefix for gain-change keys built from `<sensor> (<channel>) : gain: <value>`.
pub const GAIN_PREFIX: &str = "gain:";

/// Prefix for sleep-stage keys built from the stage file.
pub const STAGE_PREFIX: &str = "stage:";

/// Prefix added to scored-event names before mapping, so that the table can
/// tell them apart from log-file annotations with the same text.
pub const GAMMA_KEY_PREFIX: &str = "gamma_";

/// Length of one scoring epoch in seconds.
pub const EPOCH_SECONDS: i64 = 30;

/// Duration assigned to events that legitimately omit one (arousals, leg
/// movements, snores).
pub const NOMINAL_DURATION: f64 = 3.0;

/// Event prefixes of the single-file format that carry a duration pattern.
pub const TWIN_FAMILY_KEYS: [&str; 6] = [
    "arousal",
    "respiratory event",
    "desaturation",
    "lm",
    "ekg events",
    "snore",
];

/// Description prefixes that select the brief (optional duration) pattern.
pub const TWIN_BRIEF_PREFIXES: [&str; 4] = ["arousal", "lm", "ekg", "snore"];

/// Mapped scored-event keys that fall back to [`NOMINAL_DURATION`].
pub const NOMINAL_DURATION_KEYS: [&str; 4] = ["arousal", "leg_movement", "snore", "artifact"];

/// Mapped key whose durations use the wider centisecond threshold.
pub const DESATURATION_KEY: &str = "desaturation";

/// Desaturations shorter than this were written as centiseconds-as-fraction.
pub const DESATURATION_CENTI_THRESHOLD: f64 = 10.0;

/// Any scored event shorter than this was written as centiseconds-as-fraction.
pub const CENTI_THRESHOLD: f64 = 5.0;

pub const CENTI_SCALE: f64 = 100.0;

/// Numeric stage codes of the stage file and their canonical labels.
pub const STAGE_CODES: [(&str, &str); 8] = [
    ("0", "w"),
    ("1", "n1"),
    ("2", "n2"),
    ("3", "n3"),
    ("4", "n3"),
    ("5", "rem"),
    ("6", "undefined"),
    ("7", "undefined"),
];

pub const UNDEFINED_STAGE: &str = "undefined";

/// `respiratory event - dur: 12.5 sec. - obstructive apnea - desat -3.0 %`
pub static TWIN_RESPIRATORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<event_key>\w+\s\w+) - dur: (?P<duration>\d+.\d) sec. - (?P<event_type>\w+\s?\w*) - desat (?P<param1>-?\d+.\d|<n/a>)\s?%?",
    )
    .expect("Invalid respiratory event regex pattern")
});

/// `desaturation - dur: 20.0 sec. - min 88.0 % - drop -4.0 %`
pub static TWIN_DESATURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<event_key>\w+) - dur: (?P<duration>\d+.\d) sec. - min (?P<param1>\d+.\d) % - drop (?P<param2>-?\d+.\d) %",
    )
    .expect("Invalid desaturation regex pattern")
});

/// `arousal - spontaneous`, `lm - dur: 1.5 sec. - leg movement`, `ekg events - bradycardia`
pub static TWIN_BRIEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<event_key>\w+|\w+\s\w+)( - dur: (?P<duration>\d+.\d) sec. |\s)- (?P<event_type>\w+\s?\w*)",
    )
    .expect("Invalid brief event regex pattern")
});

/// Whitespace-collapsed scored-event line:
/// `<epoch> <stage pair> <n> <event> <n> [hh:mm:ss] [param1] [param2] [duration]`
pub static GAMMA_SCORED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<epoch>\d+) (?:-?\d+\s?-?\d+|) (?:-?\d+) (?P<event_key>[a-z]+2?|[a-z]+\.?\s[a-z]+2?\s?[a-z^\d]*) (?:\d+) (?P<timestamp>\d{1,2}:\d{2}:\d{2}|)\s?(?P<param1>-*\d*.?\d*)\s?(?P<param2>-?\d*.?\d*)\s?(?P<duration>-?\d*.?\d*)$",
    )
    .expect("Invalid scored event regex pattern")
});

/// `chin emg (3) : gain: 50`
pub static GAMMA_GAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<event_key>\w+|\w+\s\w+) \((?P<param2>\d+)\) : gain\s?: (?P<param1>\d+)")
        .expect("Invalid gain regex pattern")
});

/// `H:MM:SS` or `HH:MM:SS` at the start of a token.
pub static WALL_CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})").expect("Invalid wall clock regex pattern")
});

pub static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));

/// Runs of repeated `|` in a mapping line.
pub static REPEATED_PIPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|{2,}").expect("Invalid pipe regex pattern"));

/// Collapse runs of whitespace to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}
