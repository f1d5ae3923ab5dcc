use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use split_ledger::{Amount, Engine, EngineConfig, Operation, SelfSharePolicy, Split, UserId};
use uuid::Uuid;

/// Generates valid operation sequences for benchmarking.
///
/// Registers `num_users` users, then repeats per round:
/// 1. An equal split of 100 among a window of `group_size` users
/// 2. A settlement of 1 from the second user of the window to the payer
///
/// The settlement never exceeds what the expense just posted.
pub struct OpGenerator {
    users: Vec<UserId>,
    group_size: usize,
    rounds: u32,
    registered: usize,
    round: u32,
    pending_settlement: Option<Operation>,
}

impl OpGenerator {
    pub fn new(num_users: usize, group_size: usize, rounds: u32) -> Self {
        Self {
            users: (0..num_users).map(|_| Uuid::new_v4()).collect(),
            group_size: group_size.clamp(2, num_users.max(2)),
            rounds,
            registered: 0,
            round: 0,
            pending_settlement: None,
        }
    }
}

impl Iterator for OpGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.registered < self.users.len() {
            let id = self.users[self.registered];
            self.registered += 1;
            return Some(Operation::RegisterUser {
                id,
                name: format!("user {id}"),
            });
        }

        if let Some(settlement) = self.pending_settlement.take() {
            return Some(settlement);
        }

        if self.round >= self.rounds {
            return None;
        }

        let n = self.users.len();
        let start = self.round as usize % n;
        let window: Vec<UserId> = (0..self.group_size)
            .map(|i| self.users[(start + i) % n])
            .collect();
        self.round += 1;

        let payer = window[0];
        self.pending_settlement = Some(Operation::Settlement {
            id: Uuid::new_v4(),
            amount: Amount::from_cents(100),
            payer: window[1],
            payee: payer,
        });

        Some(Operation::Expense {
            id: Uuid::new_v4(),
            payer,
            group: None,
            split: Split::equal(Amount::from_cents(10_000), window),
        })
    }
}

fn bench_equal_splits(c: &mut Criterion) {
    let mut group = c.benchmark_group("equal_splits");

    for rounds in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, &rounds| {
            b.iter(|| {
                let mut engine = Engine::default();
                for op in OpGenerator::new(10, 4, rounds) {
                    let _ = black_box(engine.apply(op));
                }
                engine
            });
        });
    }

    group.finish();
}

fn bench_group_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_sizes");

    for (users, size) in [(100, 2), (100, 10), (1_000, 50)] {
        let label = format!("{users}u_{size}p");
        group.bench_with_input(
            BenchmarkId::from_parameter(&label),
            &(users, size),
            |b, &(users, size)| {
                b.iter(|| {
                    let mut engine = Engine::default();
                    for op in OpGenerator::new(users, size, 10_000) {
                        let _ = black_box(engine.apply(op));
                    }
                    engine
                });
            },
        );
    }

    group.finish();
}

fn bench_self_share(c: &mut Criterion) {
    let mut group = c.benchmark_group("self_share");

    for policy in [SelfSharePolicy::Skip, SelfSharePolicy::Post] {
        group.bench_function(format!("{policy:?}"), |b| {
            b.iter(|| {
                let mut engine = Engine::new(EngineConfig::default().with_self_share(policy));
                for op in OpGenerator::new(100, 10, 10_000) {
                    let _ = black_box(engine.apply(op));
                }
                engine
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_equal_splits,
    bench_group_sizes,
    bench_self_share
);
criterion_main!(benches);
