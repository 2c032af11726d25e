//! Test helpers for writing problem files into temporary workspaces.

use std::fs;

use airspace_core::builder::DenseAircraft;
use airspace_core::source::{Coordinate, FlightRequestRecord, ProblemData};
use airspace_core::test_support::{sample, sample_performance_records};
use airspace_core::{Cell, FlightLevel, FlightNumber, Timestamp};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::problem::{GridProblem, GridSize, ProblemFile};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write file");
}

/// Temporary directory holding problem and output files.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_problem(&self, name: &str, problem: &ProblemFile) -> Utf8PathBuf {
        let path = self.path(name);
        let payload = serde_json::to_string_pretty(problem).expect("serialise problem");
        write_utf8(&path, payload.as_bytes());
        path
    }
}

/// One aircraft hopping across a 2 × 1 × 1 grid at unit cost.
pub(super) fn hop_problem() -> ProblemFile {
    ProblemFile::Dense(GridProblem {
        size: GridSize { x: 2, y: 1, z: 1 },
        aircraft: vec![DenseAircraft {
            flight: FlightNumber(3),
            start: Cell::new(0, 0, 0),
            destination: Cell::new(1, 0, 0),
        }],
        step_cost: 1,
    })
}

fn at(longitude: i32) -> Coordinate {
    Coordinate {
        longitude,
        latitude: 0,
        flight_level: FlightLevel(300),
    }
}

fn line_data(end_longitude: i32) -> ProblemData {
    ProblemData {
        voxels: vec![
            sample(1, 0, 0, 1.0),
            sample(2, 5, 0, 1.0),
            sample(3, 10, 0, 1.0),
        ],
        performance: sample_performance_records(),
        flights: vec![FlightRequestRecord {
            flight_number: FlightNumber(4),
            start: at(0),
            start_time: Timestamp(0),
            end: at(end_longitude),
        }],
    }
}

/// Three voxels five degrees apart; only neighbours are adjacent.
pub(super) fn line_problem() -> ProblemFile {
    ProblemFile::Sparse(line_data(10))
}

/// The same samples binned into a 3 × 1 × 1 climate grid.
pub(super) fn climate_problem(end_longitude: i32) -> ProblemFile {
    ProblemFile::Climate(line_data(end_longitude))
}
