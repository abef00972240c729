use criterion::{criterion_group, criterion_main, Criterion, SamplingMode};
use std::time::Duration;
use common::games::SessionRng;
use common::games::snake::{
    BotController, Level, SessionPhase, SnakeGameState, SnakeSessionSettings,
};

const MAX_TICKS: usize = 5_000;

fn play_autopilot_game(settings: SnakeSessionSettings) -> u64 {
    let mut rng = SessionRng::from_random();
    let Ok(mut state) = SnakeGameState::new(settings, &mut rng) else {
        return 0;
    };

    for _ in 0..MAX_TICKS {
        if let Some(direction) = BotController::calculate_move(&state, &mut rng) {
            let _ = state.set_direction(direction);
        }
        let _ = state.tick(&mut rng);
        if !matches!(state.phase(), SessionPhase::Idle | SessionPhase::Running) {
            break;
        }
    }
    state.ticks()
}

fn bench_survival_game() {
    play_autopilot_game(SnakeSessionSettings::survival());
}

fn bench_objective_campaign() {
    play_autopilot_game(SnakeSessionSettings::objective(Level::campaign()));
}

fn tick_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("snake_tick");

    group
        .sampling_mode(SamplingMode::Flat)
        .sample_size(20)
        .measurement_time(Duration::from_secs(30));

    group.bench_function("survival_autopilot_game", |b| {
        b.iter(bench_survival_game)
    });

    group.bench_function("objective_autopilot_campaign", |b| {
        b.iter(bench_objective_campaign)
    });

    group.finish();
}

criterion_group!(benches, tick_bench);
criterion_main!(benches);
