//! Common test utilities for psgnorm integration tests.
//!
//! Fixtures are written into a `TempDir` laid out like a study folder: one
//! `<id>.edf` placeholder per recording next to its event logs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const MAPPINGS: &str = "\
# canonical|alias|alias
lights_off|lights out|gamma_lights out
lights_on|lights on
apnea_obstructive|respiratory event obstructive apnea|gamma_obst. apnea
desaturation|desaturation|gamma_desaturation
arousal_spontaneous|arousal spontaneous
arousal|gamma_arousal
";

pub const TWIN_ALLSCORE: &str = "\
21:58:00\tLights Out\n\
22:05:30\tRespiratory Event - Dur: 12.5 sec. - Obstructive Apnea - Desat -3.0 %\n\
22:06:10\tDesaturation - Dur: 20.0 sec. - Min 88.0 % - Drop -4.0 %\n\
22:07:00\tArousal - Spontaneous\n\
22:08:00\tVideo, Camera 2\n\
06:10:00\tLights On\n";

pub const GAMMA_LOG: &str = "\
22:00:00\tLights Out\t0\n\
22:00:40\tChin EMG (3) : Gain: 50\t0\n\
22:03:00\tPosition Change\t0\n\
01:30:00\tLights On\t0\n";

pub const GAMMA_STAGES: &str = "\
Epoch\tUser-Defined Stage\tCAST-Defined Stage\n\
1\t0\t0\n\
2\t1\t1\n\
3\t2\t2\n\
4\t2\t2\n";

pub const GAMMA_SCORED: &str = "\
Epoch\tStage\tPosition\tEvent\tCount\tTime\n\
2\t0 1\t0\tArousal\t1\t22:00:35\t95.0\n\
3\t0 2\t0\tObst. Apnea\t1\t22:01:05\t-3.0\t4.5\n\
4\t0 2\t0\tDesaturation\t1\t22:01:40\t88.0\t-4.0\t12.0\n";

/// A study folder with a mapping file beside it.
pub struct StudyDir {
    pub dir: TempDir,
}

impl StudyDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("psg")).expect("Failed to create study folder");
        fs::write(dir.path().join("mappings.txt"), MAPPINGS).expect("Failed to write mappings");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn folder(&self) -> PathBuf {
        self.dir.path().join("psg")
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.dir.path().join("mappings.txt")
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join("WSC_non_mapped_lines.txt")
    }

    pub fn output_path(&self, id: &str) -> PathBuf {
        self.folder().join(format!("{id}.uniform.txt"))
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.folder().join(name), contents)
            .unwrap_or_else(|e| panic!("Failed to write {name}: {e}"));
    }

    /// Add a single-file recording.
    pub fn add_twin(&self, id: &str, allscore: &str) {
        self.write(&format!("{id}.edf"), "");
        self.write(&format!("{id}.allscore.txt"), allscore);
    }

    /// Add a split recording. `None` leaves that companion file out.
    pub fn add_gamma(&self, id: &str, log: &str, stages: Option<&str>, scored: Option<&str>) {
        self.write(&format!("{id}.edf"), "");
        self.write(&format!("{id}.log.txt"), log);
        if let Some(stages) = stages {
            self.write(&format!("{id}.stg.txt"), stages);
        }
        if let Some(scored) = scored {
            self.write(&format!("{id}.sco.txt"), scored);
        }
    }

    pub fn read_output(&self, id: &str) -> String {
        fs::read_to_string(self.output_path(id))
            .unwrap_or_else(|e| panic!("Failed to read output of {id}: {e}"))
    }
}

/// Split a uniform output table into header and rows of cells, honoring
/// quoted cells.
pub fn parse_csv(contents: &str) -> Vec<Vec<String>> {
    contents.lines().map(split_csv_row).collect()
}

fn split_csv_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

/// Seconds since midnight of an `HH:MM:SS.00` output timestamp.
pub fn seconds_of_day(timestamp: &str) -> i64 {
    let parts: Vec<i64> = timestamp
        .trim_end_matches(".00")
        .split(':')
        .map(|p| p.parse().expect("Invalid timestamp"))
        .collect();
    parts[0] * 3600 + parts[1] * 60 + parts[2]
}
