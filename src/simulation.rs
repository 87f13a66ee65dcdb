//! Simulation builder and runtime.
//!
//! [`Simulation`] collects the configuration and the initial population, then
//! [`build`](Simulation::build)s a [`Flock`]. A flock moves through three
//! states:
//!
//! ```text
//! Idle --start()--> Running --stop() / Command::Quit--> Stopped
//! ```
//!
//! Each tick is two-phase. The compute phase runs the steering pipeline for
//! every normal agent against the population as it stood at the end of the
//! previous tick and collects the pending results. The commit phase then
//! writes them back and integrates every agent. No agent ever observes
//! another agent's state from the tick in progress, so the outcome does not
//! depend on iteration order.

use crate::agent::{Agent, Role};
use crate::config::{FactionProfile, FlockConfig};
use crate::control::{Command, Controller};
use crate::draw::{DrawRecord, Renderer};
use crate::error::{ConfigError, FlockError};
use crate::kinematics::Pilot;
use crate::neighbors::NeighborQuery;
use crate::pipeline::Pipeline;
use crate::rules::Rule;
use crate::spawn::SpawnContext;
use crate::stats::FlockStats;
use glam::Vec2;

type Spawner = Box<dyn Fn(&mut SpawnContext) -> Agent + Send + Sync>;

/// A flock builder.
///
/// Use method chaining to configure, then call `.build()`:
///
/// ```ignore
/// let mut flock = Simulation::new()
///     .with_config(Scenario::LeaderFollow.config())
///     .with_agent_count(30)
///     .with_agent(Agent::new(Vec2::new(500.0, 500.0), 0.0, 0.0).role(Role::Leader))
///     .with_seed(7)
///     .build()?;
/// ```
pub struct Simulation {
    config: FlockConfig,
    agent_count: u32,
    spawner: Option<Spawner>,
    fixed: Vec<Agent>,
    rules: Option<Pipeline>,
    seed: Option<u64>,
}

impl Simulation {
    /// Create a simulation with the default configuration and 30 followers.
    pub fn new() -> Self {
        Self {
            config: FlockConfig::default(),
            agent_count: 30,
            spawner: None,
            fixed: Vec::new(),
            rules: None,
            seed: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: FlockConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of spawned followers.
    pub fn with_agent_count(mut self, count: u32) -> Self {
        self.agent_count = count;
        self
    }

    /// Set the follower spawner.
    ///
    /// Called once per follower. Without a spawner, followers are scattered
    /// by [`SpawnContext::follower`].
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> Agent + Send + Sync + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    /// Add a fixed agent (typically a leader or predator) after the followers.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.fixed.push(agent);
        self
    }

    /// Add a rule.
    ///
    /// Rules added here replace the configured pipeline as a whole.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.get_or_insert_with(Pipeline::new).push(rule);
        self
    }

    /// Seed the spawn RNG for a reproducible initial population.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and spawn the population.
    pub fn build(self) -> Result<Flock, FlockError> {
        let mut config = self.config;
        if let Some(pipeline) = self.rules {
            config.pipeline = pipeline;
        }
        config.validate()?;

        let profile = config
            .factions
            .first()
            .copied()
            .unwrap_or_else(|| FactionProfile::new(0, 3.0, 4.0));

        let count = self.agent_count;
        let mut agents: Vec<Agent> = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, count, config.world, profile, self.seed);
                match &self.spawner {
                    Some(spawner) => spawner(&mut ctx),
                    None => ctx.follower(),
                }
            })
            .collect();
        agents.extend(self.fixed);

        if !config.factions.is_empty() {
            if let Some(stray) = agents.iter().find(|a| config.profile(a.faction).is_none()) {
                return Err(ConfigError::UnknownFaction(stray.faction.0).into());
            }
        }

        Ok(Flock::new(agents, config))
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of a [`Flock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlockState {
    /// Built but not started.
    Idle,
    /// Ticking.
    Running,
    /// Quit. No further ticks execute.
    Stopped,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Number of completed ticks, including this one.
    pub tick: u64,
    /// Agents that ran the steering pipeline.
    pub steered: usize,
    /// Agents caught by a predator this tick.
    pub caught: usize,
    /// Agents still visible after the tick.
    pub visible: usize,
}

/// A running population of agents.
pub struct Flock {
    agents: Vec<Agent>,
    config: FlockConfig,
    query: NeighborQuery,
    state: FlockState,
    tick: u64,
    controllable: Option<usize>,
}

impl Flock {
    fn new(agents: Vec<Agent>, config: FlockConfig) -> Self {
        let controllable = agents
            .iter()
            .position(|a| a.role == Role::Leader)
            .or_else(|| agents.iter().position(|a| a.role == Role::Predator));
        let query = NeighborQuery::from_config(&config);

        log::info!(
            "built flock: {} agents ({} leaders, {} predators), {:?} motion, {} rules",
            agents.len(),
            agents.iter().filter(|a| a.role == Role::Leader).count(),
            agents.iter().filter(|a| a.role == Role::Predator).count(),
            config.motion,
            config.pipeline.len()
        );

        Self {
            agents,
            config,
            query,
            state: FlockState::Idle,
            tick: 0,
            controllable,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn state(&self) -> FlockState {
        self.state
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Index of the agent that receives commands: the first leader, else the
    /// first predator.
    pub fn controllable(&self) -> Option<usize> {
        self.controllable
    }

    pub fn controllable_agent(&self) -> Option<&Agent> {
        self.controllable.map(|i| &self.agents[i])
    }

    /// Leave `Idle`. Starting a running flock does nothing.
    pub fn start(&mut self) -> Result<(), FlockError> {
        match self.state {
            FlockState::Idle => {
                log::info!("flock started");
                self.state = FlockState::Running;
                Ok(())
            }
            FlockState::Running => Ok(()),
            FlockState::Stopped => Err(FlockError::Restart),
        }
    }

    /// Enter `Stopped`.
    pub fn stop(&mut self) {
        if self.state != FlockState::Stopped {
            log::info!("flock stopped after {} ticks", self.tick);
            self.state = FlockState::Stopped;
        }
    }

    /// Apply a command now, before the next tick.
    ///
    /// A stopped flock ignores every command.
    pub fn apply(&mut self, command: Command) {
        if self.state == FlockState::Stopped {
            log::debug!("ignoring {:?}: flock is stopped", command);
            return;
        }
        if command == Command::Quit {
            self.stop();
            return;
        }
        let Some(index) = self.controllable else {
            log::warn!("ignoring {:?}: no leader or predator to steer", command);
            return;
        };

        let agent = &mut self.agents[index];
        let motion = self.config.motion_for(agent.faction);
        let mut pilot = Pilot::new(agent, motion, self.config.turn_rate);
        match command {
            Command::TurnLeft(magnitude) => pilot.turn_left(magnitude),
            Command::TurnRight(magnitude) => pilot.turn_right(magnitude),
            Command::Accelerate(delta) => pilot.push(delta),
            Command::Quit => {}
        }
        agent.commit(&pilot);
        log::trace!("agent {} applied {:?}", index, command);
    }

    /// Run one tick.
    pub fn step(&mut self) -> Result<TickSummary, FlockError> {
        if self.state != FlockState::Running {
            return Err(FlockError::NotRunning(self.state));
        }

        // compute: every pilot reads the same snapshot
        let snapshot = &self.agents;
        let pilots: Vec<Option<Pilot>> = snapshot
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                agent.role.is_autonomous().then(|| {
                    self.config
                        .pipeline
                        .run(index, snapshot, &self.config, &self.query)
                })
            })
            .collect();
        let steered = pilots.iter().flatten().count();

        // commit
        for (agent, pilot) in self.agents.iter_mut().zip(&pilots) {
            if let Some(pilot) = pilot {
                agent.commit(pilot);
            }
            agent.integrate(self.config.motion_for(agent.faction), &self.config.world);
        }

        let caught = if self.config.predator_catch {
            self.catch()
        } else {
            0
        };

        self.tick += 1;
        let summary = TickSummary {
            tick: self.tick,
            steered,
            caught,
            visible: self.agents.iter().filter(|a| a.visible).count(),
        };
        log::debug!("{:?}", summary);
        Ok(summary)
    }

    /// Hide visible normal agents touching a predator.
    fn catch(&mut self) -> usize {
        let predators: Vec<(Vec2, f32)> = self
            .agents
            .iter()
            .filter(|a| a.role == Role::Predator)
            .map(|a| (a.position, a.size))
            .collect();
        if predators.is_empty() {
            return 0;
        }

        let mut caught = 0;
        for (index, agent) in self.agents.iter_mut().enumerate() {
            if agent.role != Role::Normal || !agent.visible {
                continue;
            }
            let touching = predators.iter().any(|&(position, size)| {
                agent.position.distance(position) < agent.size / 2.0 + size / 2.0
            });
            if touching {
                agent.visible = false;
                caught += 1;
                log::info!("agent {} caught at tick {}", index, self.tick + 1);
            }
        }
        caught
    }

    /// Drive ticks until quit, polling `controller` before each tick and
    /// handing each committed frame to `renderer`.
    ///
    /// Starts an idle flock. With `max_ticks`, stops after that many ticks of
    /// this call; the flock stays running. Returns the ticks run.
    pub fn run<C, R>(
        &mut self,
        mut controller: C,
        mut renderer: R,
        max_ticks: Option<u64>,
    ) -> Result<u64, FlockError>
    where
        C: Controller,
        R: Renderer,
    {
        self.start()?;
        let mut records = Vec::with_capacity(self.agents.len());
        let mut ran = 0;

        while max_ticks.map_or(true, |max| ran < max) {
            for command in controller.poll(self.tick) {
                self.apply(command);
                if self.state == FlockState::Stopped {
                    break;
                }
            }
            if self.state == FlockState::Stopped {
                break;
            }

            self.step()?;
            ran += 1;

            self.draw_into(&mut records);
            renderer.draw(self.tick, &records);
        }

        Ok(ran)
    }

    /// Draw records for the committed state, in population order.
    pub fn draw_records(&self) -> Vec<DrawRecord> {
        self.agents.iter().map(DrawRecord::from).collect()
    }

    /// Like [`draw_records`](Self::draw_records), reusing `buffer`.
    pub fn draw_into(&self, buffer: &mut Vec<DrawRecord>) {
        buffer.clear();
        buffer.extend(self.agents.iter().map(DrawRecord::from));
    }

    /// Statistics over the normal agents.
    pub fn stats(&self) -> FlockStats {
        FlockStats::measure(self.agents.iter().filter(|a| a.role == Role::Normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FactionId;
    use crate::kinematics::DEFAULT_TURN_RATE;
    use approx::assert_relative_eq;

    fn leader() -> Agent {
        Agent::new(Vec2::new(500.0, 400.0), 0.0, 0.0).role(Role::Leader)
    }

    // ========== Builder ==========

    #[test]
    fn test_build_spawns_followers_then_fixed() {
        let flock = Simulation::new()
            .with_agent_count(5)
            .with_agent(leader())
            .with_seed(1)
            .build()
            .unwrap();

        assert_eq!(flock.agents().len(), 6);
        assert!(flock.agents()[..5].iter().all(|a| a.role == Role::Normal));
        assert_eq!(flock.controllable(), Some(5));
        assert_eq!(flock.state(), FlockState::Idle);
    }

    #[test]
    fn test_seeded_builds_match() {
        let a = Simulation::new().with_seed(42).build().unwrap();
        let b = Simulation::new().with_seed(42).build().unwrap();
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = FlockConfig {
            num_interaction_partners: 0,
            ..FlockConfig::default()
        };
        let result = Simulation::new().with_config(config).build();
        assert!(matches!(
            result,
            Err(FlockError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_build_rejects_unknown_faction() {
        let stray = Agent::new(Vec2::new(500.0, 400.0), 0.0, 1.0).faction(FactionId(9));
        let result = Simulation::new().with_agent(stray).build();
        assert!(matches!(
            result,
            Err(FlockError::Config(ConfigError::UnknownFaction(9)))
        ));
    }

    #[test]
    fn test_with_rule_replaces_pipeline() {
        let flock = Simulation::new()
            .with_rule(Rule::Separation)
            .build()
            .unwrap();
        assert_eq!(flock.config().pipeline.len(), 1);
    }

    #[test]
    fn test_predator_is_controllable_without_leader() {
        let predator = Agent::new(Vec2::new(500.0, 400.0), 0.0, 5.0).role(Role::Predator);
        let flock = Simulation::new()
            .with_agent_count(3)
            .with_agent(predator)
            .build()
            .unwrap();
        assert_eq!(flock.controllable(), Some(3));
    }

    // ========== State machine ==========

    #[test]
    fn test_step_requires_running() {
        let mut flock = Simulation::new().with_agent_count(3).build().unwrap();
        assert!(matches!(
            flock.step(),
            Err(FlockError::NotRunning(FlockState::Idle))
        ));

        flock.start().unwrap();
        assert_eq!(flock.step().unwrap().tick, 1);

        flock.apply(Command::Quit);
        assert_eq!(flock.state(), FlockState::Stopped);
        assert!(matches!(
            flock.step(),
            Err(FlockError::NotRunning(FlockState::Stopped))
        ));
        assert!(matches!(flock.start(), Err(FlockError::Restart)));
        assert_eq!(flock.tick(), 1);
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut flock = Simulation::new().with_agent_count(4).build().unwrap();
        let controller = |tick: u64| {
            if tick == 3 {
                vec![Command::Quit]
            } else {
                Vec::new()
            }
        };
        let mut frames = 0;
        let renderer = |_: u64, records: &[DrawRecord]| {
            assert_eq!(records.len(), 4);
            frames += 1;
        };
        let ran = flock.run(controller, renderer, None).unwrap();

        assert_eq!(ran, 3);
        assert_eq!(frames, 3);
        assert_eq!(flock.state(), FlockState::Stopped);
    }

    #[test]
    fn test_run_honours_tick_limit() {
        let mut flock = Simulation::new().with_agent_count(4).build().unwrap();
        assert_eq!(flock.run((), (), Some(5)).unwrap(), 5);
        assert_eq!(flock.state(), FlockState::Running);
        assert_eq!(flock.run((), (), Some(2)).unwrap(), 2);
        assert_eq!(flock.tick(), 7);
    }

    // ========== Commands ==========

    #[test]
    fn test_turn_commands_steer_leader() {
        let mut flock = Simulation::new()
            .with_agent_count(2)
            .with_agent(leader())
            .build()
            .unwrap();

        flock.apply(Command::TurnRight(2.0));
        let heading = flock.controllable_agent().unwrap().heading;
        assert_relative_eq!(heading, 2.0 * DEFAULT_TURN_RATE);

        flock.apply(Command::TurnLeft(2.0));
        flock.apply(Command::TurnLeft(2.0));
        let heading = flock.controllable_agent().unwrap().heading;
        assert_relative_eq!(heading, -2.0 * DEFAULT_TURN_RATE);
    }

    #[test]
    fn test_stats_cover_normal_agents_only() {
        let flock = Simulation::new()
            .with_agent_count(4)
            .with_agent(leader())
            .with_seed(5)
            .build()
            .unwrap();
        let stats = flock.stats();

        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean_speed, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_commands_after_quit_are_dropped() {
        let mut flock = Simulation::new()
            .with_agent_count(2)
            .with_agent(leader())
            .build()
            .unwrap();
        let controller = |_: u64| vec![Command::Quit, Command::TurnRight(4.0)];

        assert_eq!(flock.run(controller, (), None).unwrap(), 0);
        assert_eq!(flock.state(), FlockState::Stopped);
        assert_eq!(flock.controllable_agent().unwrap().heading, 0.0);

        flock.apply(Command::TurnLeft(2.0));
        assert_eq!(flock.controllable_agent().unwrap().heading, 0.0);
    }

    #[test]
    fn test_commands_without_controllable_are_ignored() {
        let mut flock = Simulation::new().with_agent_count(2).build().unwrap();
        let before = flock.agents().to_vec();
        flock.apply(Command::TurnLeft(1.0));
        assert_eq!(flock.agents(), &before[..]);
    }

    #[test]
    fn test_leader_is_not_steered_by_pipeline() {
        let mut flock = Simulation::new()
            .with_agent_count(10)
            .with_agent(leader())
            .with_seed(3)
            .build()
            .unwrap();
        flock.start().unwrap();
        let summary = flock.step().unwrap();

        assert_eq!(summary.steered, 10);
        let leader = flock.controllable_agent().unwrap();
        assert_eq!(leader.position, Vec2::new(500.0, 400.0));
        assert_eq!(leader.heading, 0.0);
    }

    // ========== Catch ==========

    #[test]
    fn test_catch_hides_touching_agents() {
        let config = FlockConfig {
            predator_catch: true,
            ..FlockConfig::default()
        };
        let prey = Agent::new(Vec2::new(500.0, 400.0), 0.0, 0.0).size(10.0);
        let predator = Agent::new(Vec2::new(515.0, 400.0), 0.0, 0.0)
            .role(Role::Predator)
            .size(30.0);
        let mut flock = Simulation::new()
            .with_config(config)
            .with_agent_count(0)
            .with_agent(prey)
            .with_agent(predator)
            .build()
            .unwrap();
        flock.start().unwrap();

        let summary = flock.step().unwrap();
        assert_eq!(summary.caught, 1);
        assert_eq!(summary.visible, 1);
        assert!(!flock.agents()[0].visible);

        assert_eq!(flock.step().unwrap().caught, 0);
    }
}
