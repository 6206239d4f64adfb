use kinship_lib::model::config::AppConfig;
use kinship_lib::World;

fn crowded_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.seed = Some(seed);
    config.world.width = 150.0;
    config.world.height = 150.0;
    config.world.emotional_fraction = 0.4;
    config.contagion.base_chance = 0.5;
    config
}

fn run(seed: u64, steps: usize) -> World {
    let mut world = World::new(300, crowded_config(seed)).expect("Failed to create world");
    for _ in 0..steps {
        world.update(0.25);
    }
    world
}

#[test]
fn test_determinism_consistency() {
    let world1 = run(12345, 40);
    let world2 = run(12345, 40);

    assert_eq!(world1.population(), world2.population());
    assert_eq!(world1.agents(), world2.agents(), "Agent states diverged");
    assert_eq!(world1.emotion_census(), world2.emotion_census());
}

#[test]
fn test_runs_actually_spread_emotions() {
    let world = run(12345, 40);
    let caught: u32 = world
        .agents()
        .iter()
        .filter_map(|a| a.empathy)
        .map(|e| e.contagion_events)
        .sum();
    assert!(caught > 0, "no contagion in a crowded world");
}

#[test]
fn test_different_seeds_diverge() {
    assert_ne!(run(1, 20).agents(), run(2, 20).agents());
}

#[test]
fn test_thread_count_does_not_change_outcome() {
    let in_pool = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("thread pool")
            .install(|| run(777, 30).agents())
    };

    let single = in_pool(1);
    assert_eq!(single, in_pool(2));
    assert_eq!(single, in_pool(8));
}
