// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::Parser;
use shift_alloc_model::err::{InputError, RecordSource};
use shift_alloc_solver::{
    meta::config::MetaConfig,
    session::{ALLOCATIONS_OUTPUT_FILE, AllocationSession},
};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Allocates employees to shifts from the CSV tables in a folder.
#[derive(Debug, Parser)]
#[command(name = "shift-alloc", version, about)]
struct Cli {
    /// Folder holding employee_information.csv, employee_availability.csv
    /// and shift_information.csv.
    folder: PathBuf,

    /// Wall-clock budget for the search, in seconds.
    #[arg(long)]
    seconds: Option<u64>,

    /// Stop the search after this many rounds.
    #[arg(long)]
    iterations: Option<u64>,

    /// Seed for the search; equal seeds and iteration limits reproduce a run.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn config(&self) -> MetaConfig {
        let mut cfg = MetaConfig::default()
            .with_time_limit(self.seconds.map(Duration::from_secs))
            .with_max_iterations(self.iterations);
        if let Some(seed) = self.seed {
            cfg = cfg.with_seed(seed);
        }
        cfg
    }
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn describe(err: &InputError) -> String {
    match err {
        InputError::DuplicateEmployeeId(e) => format!(
            "Your CSV file {} has a duplicate employee id: {}",
            RecordSource::Employees,
            e.id().value()
        ),
        InputError::DuplicateShiftId(e) => format!(
            "Your CSV file {} has a duplicate shift id: {}",
            RecordSource::Shifts,
            e.id().value()
        ),
        InputError::StartNotBeforeEnd(e) => format!(
            "Your CSV file {} has 1 or more start times at the same time or after the corresponding end times (row {})",
            e.table(),
            e.row_id()
        ),
        InputError::UnknownAvailabilityEmployee(e) => format!(
            "Your CSV {} has employee ids which don't match any employee in {}: {}",
            RecordSource::Availabilities,
            RecordSource::Employees,
            e.ids()
                .iter()
                .map(|id| id.value())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        InputError::MalformedRecord(e) => format!(
            "Your CSV file {} disobeys the format requirements at line {}: {}",
            e.table(),
            e.line(),
            e.message()
        ),
        InputError::Unreadable(e) => format!("File {} could not be loaded", e.path().display()),
    }
}

fn main() -> ExitCode {
    enable_tracing();
    let cli = Cli::parse();

    let mut session = AllocationSession::new();
    if let Err(e) = session.load_from_folder(&cli.folder) {
        error!(error = %e, "Input rejected");
        println!("{}", describe(&e));
        return ExitCode::FAILURE;
    }

    let score = session.allocate_shifts(cli.config());
    if let Some(explanation) = session.explain_score() {
        println!("{explanation}");
    }

    if !score.is_feasible() {
        println!("ALLOCATION FAILED. Score is = {score}");
        return ExitCode::FAILURE;
    }

    let out = cli.folder.join(ALLOCATIONS_OUTPUT_FILE);
    match session.write_allocations(&out) {
        Ok(_) => {
            println!("ALLOCATION SUCCESS. Score is = {score}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Writing allocations failed");
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
