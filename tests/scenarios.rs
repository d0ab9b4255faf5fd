use episim::models::{HealthState, Population, PopulationConfig, TrajectoryRecord};
use episim::SimError;
use proptest::prelude::*;

fn displacement(record: &TrajectoryRecord, from: usize, to: usize, agent: usize) -> f64 {
    let dx = record.x[to][agent] - record.x[from][agent];
    let dy = record.y[to][agent] - record.y[from][agent];
    (dx * dx + dy * dy).sqrt()
}

fn assert_recovered_is_terminal(record: &TrajectoryRecord) {
    for step in 1..record.len() {
        for (agent, state) in record.state[step - 1].iter().enumerate() {
            if *state == HealthState::Recovered {
                assert_eq!(record.state[step][agent], HealthState::Recovered);
            }
        }
    }
}

#[test]
fn all_infected_population_eventually_recovers() -> Result<(), SimError> {
    let mut population = Population::new(10, 1.0, 0.0, 2024)?;
    // 閾値 14 / dt 0.1 = 140 ステップ以降、毎ティック 50% で回復
    let record = population.run(400, None)?;

    assert_eq!(record.i[0], 10);
    assert_eq!(record.s[0], 0);
    let first_full = record
        .r
        .iter()
        .position(|&r| r == 10)
        .expect("all agents should recover within 400 steps");
    assert!(first_full > 140);
    assert!(record.r[first_full..].iter().all(|&r| r == 10));
    assert!(record.s.iter().all(|&s| s == 0));
    assert_recovered_is_terminal(&record);
    Ok(())
}

#[test]
fn fully_distancing_population_does_not_spread() -> Result<(), SimError> {
    let config = PopulationConfig {
        count: 50,
        initial_infection_probability: 0.2,
        distancing_probability: 1.0,
        seed: 99,
        ..PopulationConfig::default()
    };
    let mut population = Population::from_config(&config)?;
    let radius = population.contact_radius();
    let record = population.run(100, None)?;

    // 初期位置で誰かと接触している感受性者だけが感染し得る
    let positions = record.positions(0).expect("initial snapshot");
    let exposed = (0..config.count)
        .filter(|&a| record.state[0][a] == HealthState::Susceptible)
        .filter(|&a| {
            (0..config.count).any(|b| b != a && positions[a].distance(&positions[b]) < 2.0 * radius)
        })
        .count();

    for step in 0..record.len() {
        assert!(record.distancing[step].iter().all(|&d| d));
        assert_eq!(record.x[step], record.x[0]);
        assert_eq!(record.y[step], record.y[0]);
        // 100 ステップ (時間 10) では回復閾値に届かない
        assert!(record.i[step] >= record.i[0]);
        assert!(record.i[step] <= record.i[0] + exposed);
    }
    Ok(())
}

#[test]
fn distancing_stop_releases_everyone() -> Result<(), SimError> {
    let config = PopulationConfig {
        count: 40,
        initial_infection_probability: 0.1,
        distancing_probability: 0.5,
        seed: 5,
        ..PopulationConfig::default()
    };
    let mut population = Population::from_config(&config)?;
    let record = population.run(10, Some(5))?;
    assert_eq!(record.len(), 10);

    let distancing: Vec<usize> = (0..config.count).filter(|&a| record.distancing[0][a]).collect();
    assert!(!distancing.is_empty());

    for step in 0..5 {
        assert_eq!(record.distancing[step], record.distancing[0]);
    }
    for step in 5..10 {
        assert!(record.distancing[step].iter().all(|&d| !d));
    }

    for &agent in &distancing {
        assert!(displacement(&record, 0, 4, agent) < 1e-2);
        assert!(displacement(&record, 5, 9, agent) > 0.0);
    }
    Ok(())
}

#[test]
fn identical_seed_gives_identical_trajectory() -> Result<(), SimError> {
    let config = PopulationConfig {
        count: 60,
        initial_infection_probability: 0.1,
        distancing_probability: 0.3,
        seed: 123,
        ..PopulationConfig::default()
    };
    let first = Population::from_config(&config)?.run(200, Some(100))?;
    let second = Population::from_config(&config)?.run(200, Some(100))?;
    assert_eq!(first, second);

    let other = Population::from_config(&PopulationConfig { seed: 124, ..config })?.run(200, Some(100))?;
    assert_ne!(first.x, other.x);
    Ok(())
}

#[test]
fn crowded_population_spreads_infection() -> Result<(), SimError> {
    let config = PopulationConfig {
        count: 100,
        initial_infection_probability: 0.1,
        distancing_probability: 0.0,
        area: episim::models::BoundedArea::new(0.0, 20.0, 0.0, 20.0)?,
        seed: 17,
        ..PopulationConfig::default()
    };
    let record = Population::from_config(&config)?.run(300, None)?;
    let (_, peak) = record.peak_infected().expect("non-empty record");
    assert!(peak > record.i[0]);
    assert_recovered_is_terminal(&record);
    Ok(())
}

#[test]
fn invalid_run_arguments_fail_before_stepping() -> Result<(), SimError> {
    let mut population = Population::new(5, 0.5, 0.5, 1)?;
    let before = population.snapshot();
    assert!(matches!(population.run(0, None), Err(SimError::InvalidSteps(0))));
    assert!(matches!(
        population.run(5, Some(7)),
        Err(SimError::InvalidStopStep { step: 7, steps: 5 })
    ));
    assert_eq!(population.snapshot(), before);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sir_counts_always_sum_to_population(
        count in 1usize..40,
        p_infected in 0.0f64..=1.0,
        p_distancing in 0.0f64..=1.0,
        steps in 1usize..60,
        seed in any::<u64>(),
    ) {
        let mut population = Population::new(count, p_infected, p_distancing, seed).unwrap();
        let record = population.run(steps, None).unwrap();
        prop_assert_eq!(record.len(), steps);
        for step in 0..record.len() {
            prop_assert_eq!(record.s[step] + record.i[step] + record.r[step], count);
            prop_assert_eq!(record.state[step].len(), count);
        }
        assert_recovered_is_terminal(&record);
    }
}
