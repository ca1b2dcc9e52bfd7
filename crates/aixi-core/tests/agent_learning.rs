//! End-to-end learning tests: the agent against live environments.
//!
//! The default suite runs scaled-down versions of the acceptance scenarios
//! (small trees, modest simulation budgets) with conservative thresholds;
//! the published-parameter runs are `#[ignore]`d because they take minutes.

use aixi_core::agent::Agent;
use aixi_core::config::AgentConfig;
use aixi_core::env::{create_environment, Environment, PerceptSpace};
use aixi_core::options::Options;
use aixi_core::rng;
use aixi_core::{Action, Percept};

/// A two-armed Bernoulli bandit: no observation signal, reward 0 or 1 with
/// a per-arm mean.
#[derive(Debug)]
struct Bandit {
    arm_means: [f64; 2],
    reward: Percept,
}

impl Bandit {
    fn new(arm_means: [f64; 2]) -> Self {
        Self {
            arm_means,
            reward: 0,
        }
    }
}

impl Environment for Bandit {
    fn perform_action(&mut self, action: Action) {
        self.reward = u64::from(rng::rand01() < self.arm_means[action as usize]);
    }

    fn observation(&self) -> Percept {
        0
    }

    fn reward(&self) -> Percept {
        self.reward
    }

    fn max_action(&self) -> Action {
        1
    }

    fn max_observation(&self) -> Percept {
        0
    }

    fn max_reward(&self) -> Percept {
        1
    }
}

/// Drive `cycles` interaction cycles choosing actions with `policy`,
/// returning the per-cycle rewards seen by the agent.
fn drive(
    agent: &mut Agent,
    env: &mut dyn Environment,
    cycles: usize,
    mut policy: impl FnMut(&mut Agent) -> Action,
) -> Vec<u64> {
    let mut rewards = Vec::with_capacity(cycles);
    for _ in 0..cycles {
        let (observation, reward) = (env.observation(), env.reward());
        rewards.push(reward);
        agent.model_update_percept(observation, reward);
        let action = policy(agent);
        env.perform_action(action);
        agent.model_update_action(action);
    }
    rewards
}

fn agent_for(env: &dyn Environment, depth: usize, horizon: u64, simulations: u64) -> Agent {
    let config = AgentConfig {
        ct_depth: depth,
        horizon,
        mc_simulations: simulations,
        learning_period: 0,
    };
    Agent::new(config, PerceptSpace::of(env))
}

#[test]
fn search_prefers_the_better_bandit_arm() {
    rng::seed(0);
    let mut env = Bandit::new([0.2, 0.8]);
    let mut agent = agent_for(&env, 4, 2, 500);

    // Learn the reward statistics under a uniform-random policy.
    drive(&mut agent, &mut env, 300, |a| a.gen_random_action());

    // The planner must now separate the arms decisively.
    agent.model_update_percept(env.observation(), env.reward());
    let mut preferred = 0;
    for _ in 0..5 {
        if agent.search() == 1 {
            preferred += 1;
        }
    }
    assert!(preferred >= 4, "arm 1 chosen only {preferred}/5 times");
}

#[test]
fn search_is_deterministic_on_a_deterministic_bandit() {
    rng::seed(3);
    // Degenerate means: arm 1 always pays, arm 0 never does.
    let mut env = Bandit::new([0.0, 1.0]);
    let mut agent = agent_for(&env, 4, 2, 200);

    drive(&mut agent, &mut env, 150, |a| a.gen_random_action());

    agent.model_update_percept(env.observation(), env.reward());
    for _ in 0..3 {
        assert_eq!(agent.search(), 1);
    }
}

#[test]
fn coin_flip_average_reward_beats_chance() {
    rng::seed(0);
    let options = Options::new();
    let mut env = create_environment("coin-flip", &options).unwrap();
    let mut agent = agent_for(env.as_ref(), 8, 3, 100);

    let rewards = drive(&mut agent, env.as_mut(), 1000, |a| a.search());

    // A chance predictor averages 0.5; tracking the 0.7 bias must show in
    // the second half of the run.
    let late = &rewards[500..];
    let average = late.iter().sum::<u64>() as f64 / late.len() as f64;
    assert!(average > 0.6, "late average reward {average}");
}

#[test]
fn model_statistics_survive_a_long_run() {
    rng::seed(4);
    let options = Options::new();
    let mut env = create_environment("rock-paper-scissors", &options).unwrap();
    let mut agent = agent_for(env.as_ref(), 8, 2, 20);

    drive(&mut agent, env.as_mut(), 200, |a| a.search());

    // Invariants that must hold whatever was learned.
    assert_eq!(agent.age(), 200);
    let bits_per_cycle = (agent.percept_space().percept_bits()
        + agent.percept_space().action_bits()) as usize;
    assert_eq!(agent.history_size(), 200 * bits_per_cycle);
    assert!(agent.model_size() > 1);
}

// ----------------------------------------------------------------------------
// Published-parameter acceptance runs (minutes each; run on demand).
// ----------------------------------------------------------------------------

#[test]
#[ignore = "full-scale acceptance run"]
fn coin_flip_reference_parameters() {
    rng::seed(0);
    let options = Options::new();
    let mut env = create_environment("coin-flip", &options).unwrap();
    let mut agent = agent_for(env.as_ref(), 30, 5, 300);

    let rewards = drive(&mut agent, env.as_mut(), 10_000, |a| a.search());
    let average = rewards.iter().sum::<u64>() as f64 / rewards.len() as f64;
    assert!(average > 0.65, "average reward {average}");
}

#[test]
#[ignore = "full-scale acceptance run"]
fn rock_paper_scissors_exploits_the_biased_opponent() {
    rng::seed(0);
    let options = Options::new();
    let mut env = create_environment("rock-paper-scissors", &options).unwrap();
    let mut agent = agent_for(env.as_ref(), 32, 4, 300);

    let rewards = drive(&mut agent, env.as_mut(), 10_000, |a| a.search());
    let late = &rewards[5_000..];
    let average = late.iter().sum::<u64>() as f64 / late.len() as f64;
    assert!(average > 1.4, "late average reward {average}");
}

#[test]
#[ignore = "full-scale acceptance run"]
fn tiger_beats_the_always_listen_baseline() {
    rng::seed(0);
    let mut options = Options::new();
    options.set("tiger-listen-accuracy", "0.85");
    let mut env = create_environment("tiger", &options).unwrap();
    let mut agent = agent_for(env.as_ref(), 96, 5, 300);

    let rewards = drive(&mut agent, env.as_mut(), 5_000, |a| a.search());
    let late = &rewards[2_500..];
    let average = late.iter().sum::<u64>() as f64 / late.len() as f64;
    // Always listening earns a shifted 99; profitable door-opening must
    // push past it.
    assert!(average > 100.0, "late average reward {average}");
}
