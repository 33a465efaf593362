use criterion::{criterion_group, criterion_main, Criterion};
use gamedex_core::normalize::normalize;

const DESCRIPTION: &str = "An open-world action role-playing game set in a \
    post-apocalyptic wasteland. Players explore ruined cities, craft weapons \
    and armor, tame mutated creatures, and battle rival factions across a \
    dynamic day-night cycle. Features co-op multiplayer for up to four \
    players, seasonal events, and full controller support on all platforms.";

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_description", |b| b.iter(|| normalize(DESCRIPTION)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
