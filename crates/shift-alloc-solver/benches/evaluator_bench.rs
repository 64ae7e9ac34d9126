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

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use chrono::{NaiveDate, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shift_alloc_core::time::TimeWindow;
use shift_alloc_model::{
    availability::{AvailabilityEntry, AvailabilityType, ShiftType},
    employee::Employee,
    id::{EmployeeId, EmployeeIndex, ShiftId, ShiftIndex},
    problem::{Problem, ProblemBuilder},
    shift::Shift,
};
use shift_alloc_solver::{
    constraints::{ScoringContext, evaluate},
    framework::{moves::Move, state::SolverState},
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::TimeDelta::days(i64::from(day))
        + chrono::TimeDelta::hours(i64::from(hour))
}

fn build_problem(employees: usize, shifts: usize) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut b = ProblemBuilder::new();
    b.add_employees((0..employees).map(|i| {
        Employee::new(EmployeeId::new(format!("e{i}")), format!("e{i}@example.com"))
            .with_importance(rng.random_range(0..4))
            .with_max_weekly_shifts(Some(rng.random_range(3..8)))
            .with_min_weekly_shifts(rng.random_range(0..3))
    }))
    .unwrap();

    let mut entries: Vec<AvailabilityEntry> = Vec::new();
    for i in 0..employees {
        for d in 0..28 {
            if !rng.random_bool(0.7) {
                continue;
            }
            let kind = if rng.random_bool(0.5) {
                AvailabilityType::Any
            } else {
                AvailabilityType::only("online")
            };
            entries.push(AvailabilityEntry::new(
                EmployeeId::new(format!("e{i}")),
                kind,
                TimeWindow::new(at(d, 6), at(d, 22)),
            ));
        }
    }
    b.add_availabilities(&entries).unwrap();

    b.add_shifts((0..shifts).map(|i| {
        let day = rng.random_range(0..28);
        let start = rng.random_range(6..18);
        let kind = if i % 3 == 0 { "in-person" } else { "online" };
        Shift::new(
            ShiftId::new(format!("s{i}")),
            ShiftType::new(kind),
            TimeWindow::new(at(day, start), at(day, start + 4)),
        )
    }))
    .unwrap();
    b.build()
}

fn random_bindings(problem: &Problem, rng: &mut ChaCha8Rng) -> Vec<Option<EmployeeIndex>> {
    (0..problem.shift_count())
        .map(|_| Some(EmployeeIndex::new(rng.random_range(0..problem.employee_count()))))
        .collect()
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    for &(employees, shifts) in &[(20usize, 200usize), (60, 1_000)] {
        let problem = build_problem(employees, shifts);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bindings = random_bindings(&problem, &mut rng);
        let ctx = ScoringContext::new(&problem);
        let state = SolverState::from_bindings(ctx.clone(), bindings.clone());
        let label = format!("{employees}x{shifts}");

        group.bench_with_input(BenchmarkId::new("full", &label), &bindings, |b, bindings| {
            b.iter(|| black_box(evaluate(&ctx, black_box(bindings))))
        });

        group.bench_with_input(BenchmarkId::new("delta", &label), &state, |b, state| {
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            b.iter(|| {
                let mv = Move::reassign(
                    ShiftIndex::new(rng.random_range(0..shifts)),
                    EmployeeIndex::new(rng.random_range(0..employees)),
                );
                black_box(state.delta(black_box(&mv)))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluation);
criterion_main!(benches);
