//! Dispatch policies: which router answers which caller.
//!
//! [`Pathfinder`] is the long-lived service a host embeds. It owns the
//! answer cache, the telemetry counters and the configuration, and exposes
//! one policy for autonomous agents and one for each player command. All
//! routing is synchronous and bounded; nothing here suspends, spawns or
//! touches global state.

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::{Agent, Environment};
use crate::cache::{PathCache, Priority};
use crate::config::NavConfig;
use crate::error::{Error, Result};
use crate::output::{SurveyMode, SurveyReport, TrackReport};
use crate::route::{self, NextStep};
use crate::search;
use crate::world::{Direction, KeyId, RoomId, World};
use crate::zone;

/// Monotonic service counters. Reset only by [`Pathfinder::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    /// Routing calls answered, all policies combined.
    pub queries: u64,
    /// Autonomous calls served straight from the cache.
    pub cache_hits: u64,
    /// Blocking-key escalations run for autonomous agents.
    pub escalations: u64,
    /// Deep state-space searches run.
    pub deep_searches: u64,
    /// Calls that named a room outside the world.
    pub invalid_queries: u64,
    /// Tracking attempts that fumbled into a guess.
    pub fumbles: u64,
}

/// Outcome of one autonomous routing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidedStep {
    pub step: NextStep,
    /// Key of the lock found to stand in the way, when an escalation ran.
    pub blocked_on: Option<KeyId>,
}

/// Long-lived pathfinding service, one per world.
///
/// Construction validates the configuration; a bad config is refused up
/// front rather than surprising the first query. The host drives the tick
/// clock through [`begin_tick`] so cache entries age with the simulation,
/// not with wall time.
///
/// [`begin_tick`]: Pathfinder::begin_tick
#[derive(Debug)]
pub struct Pathfinder {
    config: NavConfig,
    cache: PathCache,
    stats: Telemetry,
    clock: u64,
    /// Throttled-call counter for the escalation period.
    calls: u64,
}

impl Pathfinder {
    pub fn new(config: NavConfig) -> Result<Self> {
        config.validate()?;
        let cache = PathCache::new(config.cache_slots, config.cache_ttl);
        Ok(Self {
            config,
            cache,
            stats: Telemetry::default(),
            clock: 0,
            calls: 0,
        })
    }

    /// Advance the scheduling tick. Call once per simulation tick.
    pub fn begin_tick(&mut self) {
        self.clock += 1;
        self.cache.set_now(self.clock);
    }

    /// Forget cached answers and counters. For world reloads and test
    /// isolation; the tick clock keeps running.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.stats = Telemetry::default();
        self.calls = 0;
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.stats
    }

    /// Routing policy for autonomous agents.
    ///
    /// Serves from the cache first. On a miss the cheap cost-aware router
    /// answers, and a successful answer is cached, at duty tier when the
    /// agent walks its duty route. A failed route escalates to the
    /// blocking-key detector so host AI can go hunt the key, but only on a
    /// throttled fraction of ordinary calls; duty calls always may. The
    /// deep search never runs here.
    pub fn step_toward(
        &mut self,
        world: &World,
        env: &dyn Environment,
        agent: &dyn Agent,
        src: RoomId,
        dst: RoomId,
        duty: bool,
    ) -> GuidedStep {
        self.stats.queries += 1;
        self.calls += 1;

        if let Some(dir) = self.cache.lookup(src, dst) {
            self.stats.cache_hits += 1;
            return GuidedStep {
                step: NextStep::Toward(dir),
                blocked_on: None,
            };
        }

        let (step, _cost) = route::first_step_with_cost(world, &self.config, env, agent, src, dst);
        if step == NextStep::InvalidQuery {
            self.stats.invalid_queries += 1;
        }

        let mut blocked_on = None;
        if step == NextStep::NoPath
            && (duty || self.calls % u64::from(self.config.escalation_period) == 0)
        {
            self.stats.escalations += 1;
            blocked_on = route::find_blocking_key(world, &self.config, agent, src, dst);
            debug!(
                "escalated failed route {} -> {}: blocking key {:?}",
                src, dst, blocked_on
            );
        }

        if let NextStep::Toward(dir) = step {
            let tier = if duty { Priority::Duty } else { Priority::Normal };
            self.cache.insert(src, dst, dir, tier);
        }

        GuidedStep { step, blocked_on }
    }

    /// Player tracking command.
    ///
    /// Proficiency decides the machinery: below the novice gate the command
    /// fumbles into a random viable direction and pretends it worked, the
    /// middle band gets the cheap cost-aware router, and `advanced` runs
    /// the deep search with zone diagnostics once proficiency clears the
    /// expert gate. Player answers are never cached; budgets and keyrings
    /// make them too personal to share.
    pub fn track(
        &mut self,
        world: &World,
        env: &dyn Environment,
        agent: &dyn Agent,
        src: RoomId,
        dst: RoomId,
        advanced: bool,
    ) -> Result<TrackReport> {
        self.stats.queries += 1;
        self.require_room(world, src)?;
        self.require_room(world, dst)?;

        let skill = agent.tracking();
        if skill < self.config.novice_skill {
            self.stats.fumbles += 1;
            let guess = self.random_viable_direction(world, src);
            debug!("tracking fumble at skill {}: guessed {:?}", skill, guess);
            return Ok(TrackReport::fumble(guess));
        }

        if advanced && skill >= self.config.expert_skill {
            self.stats.deep_searches += 1;
            let plan = search::plan_track(world, &self.config, env, agent, src, dst);
            let recon = zone::survey(world, &self.config, agent, src, dst);
            let short = plan_overdraws(plan.moves_needed, agent);
            return Ok(TrackReport::advanced(plan, &recon, world, short));
        }

        let (step, cost) = route::first_step_with_cost(world, &self.config, env, agent, src, dst);
        Ok(TrackReport::plain(step, cost, plan_overdraws(cost, agent)))
    }

    /// Player survey command. Entirely gated behind the expert skill; below
    /// it the report is a refusal with nothing filled in.
    pub fn survey(
        &mut self,
        world: &World,
        env: &dyn Environment,
        agent: &dyn Agent,
        src: RoomId,
        dst: RoomId,
        mode: SurveyMode,
    ) -> Result<SurveyReport> {
        self.stats.queries += 1;
        self.require_room(world, src)?;
        self.require_room(world, dst)?;

        if agent.tracking() < self.config.expert_skill {
            return Ok(SurveyReport::refusal(mode));
        }

        let recon = zone::survey(world, &self.config, agent, src, dst);
        match mode {
            SurveyMode::Plain => Ok(SurveyReport::plain(&recon, world)),
            SurveyMode::Analyze => {
                let blocking = route::find_blocking_key(world, &self.config, agent, src, dst);
                Ok(SurveyReport::analysis(&recon, blocking, world))
            }
            SurveyMode::Compare => {
                let quick = route::first_step_with_cost(world, &self.config, env, agent, src, dst);
                self.stats.deep_searches += 1;
                let plan = search::plan_track(world, &self.config, env, agent, src, dst);
                let deep = (plan.step, plan.cost);
                Ok(SurveyReport::comparison(&recon, quick, deep, world))
            }
        }
    }

    fn require_room(&mut self, world: &World, room: RoomId) -> Result<()> {
        if world.room(room).is_none() {
            self.stats.invalid_queries += 1;
            warn!("player command names unknown room {}", room);
            return Err(Error::UnknownRoom { room });
        }
        Ok(())
    }

    /// Failure simulation for unskilled trackers: any viable exit, chosen
    /// at random, or nothing when the room offers none.
    fn random_viable_direction(&self, world: &World, src: RoomId) -> Option<Direction> {
        let room = world.room(src)?;
        let mut viable: Vec<Direction> = Vec::with_capacity(6);
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            if route::viable_exit(world, &self.config, exit).is_some() {
                viable.push(dir);
            }
        }
        viable.choose(&mut rand::thread_rng()).copied()
    }
}

fn plan_overdraws(moves_needed: u32, agent: &dyn Agent) -> bool {
    moves_needed > 0 && i64::from(agent.moves()) < i64::from(moves_needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ClearSkies;
    use crate::test_helpers::{TestAgent, WorldBuilder};
    use crate::world::Sector;

    fn hallway() -> World {
        WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Field)
            .room(3, Sector::Inside)
            .link_both(1, Direction::East, 2)
            .link_both(2, Direction::East, 3)
            .build()
    }

    #[test]
    fn construction_validates_the_config() {
        assert!(Pathfinder::new(NavConfig::default()).is_ok());
        let bad = NavConfig {
            cache_slots: 0,
            ..NavConfig::default()
        };
        assert!(matches!(
            Pathfinder::new(bad),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn repeat_autonomous_queries_hit_the_cache() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let npc = TestAgent::npc();

        let first = finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(first.step, NextStep::Toward(Direction::East));
        assert_eq!(finder.telemetry().cache_hits, 0);

        let second = finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(second.step, first.step);
        assert_eq!(finder.telemetry().cache_hits, 1);
        assert_eq!(finder.telemetry().queries, 2);
    }

    #[test]
    fn cache_entries_age_out_with_the_tick_clock() {
        let world = hallway();
        let config = NavConfig {
            cache_ttl: 2,
            ..NavConfig::default()
        };
        let mut finder = Pathfinder::new(config).unwrap();
        let npc = TestAgent::npc();

        finder.begin_tick();
        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        finder.begin_tick();
        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(finder.telemetry().cache_hits, 1);

        finder.begin_tick();
        finder.begin_tick();
        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(finder.telemetry().cache_hits, 1);
    }

    #[test]
    fn failed_routes_are_never_cached() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let npc = TestAgent::npc();

        for _ in 0..3 {
            let guided = finder.step_toward(&world, &ClearSkies, &npc, 1, 2, false);
            assert_eq!(guided.step, NextStep::NoPath);
        }
        assert_eq!(finder.telemetry().cache_hits, 0);
    }

    #[test]
    fn escalation_is_throttled_for_ordinary_calls() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .locked(1, Direction::East, 2, 55)
            .build();
        let config = NavConfig {
            escalation_period: 4,
            ..NavConfig::default()
        };
        let mut finder = Pathfinder::new(config).unwrap();
        finder.begin_tick();
        let npc = TestAgent::npc();

        let mut named = 0;
        for _ in 0..8 {
            let guided = finder.step_toward(&world, &ClearSkies, &npc, 1, 2, false);
            assert_eq!(guided.step, NextStep::NoPath);
            if guided.blocked_on == Some(55) {
                named += 1;
            }
        }
        assert_eq!(named, 2);
        assert_eq!(finder.telemetry().escalations, 2);
    }

    #[test]
    fn duty_calls_bypass_the_escalation_throttle() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .locked(1, Direction::East, 2, 55)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let npc = TestAgent::npc();

        for _ in 0..3 {
            let guided = finder.step_toward(&world, &ClearSkies, &npc, 1, 2, true);
            assert_eq!(guided.blocked_on, Some(55));
        }
        assert_eq!(finder.telemetry().escalations, 3);
    }

    #[test]
    fn deep_search_never_runs_for_autonomous_agents() {
        // A detour through a pickup exists, but the cheap policy must not
        // find it; it reports the blocking key instead.
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .locked(1, Direction::East, 2, 40)
            .key(1, 40)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();

        let guided = finder.step_toward(&world, &ClearSkies, &TestAgent::npc(), 1, 2, true);
        assert_eq!(guided.step, NextStep::NoPath);
        assert_eq!(guided.blocked_on, Some(40));
        assert_eq!(finder.telemetry().deep_searches, 0);
    }

    #[test]
    fn invalid_autonomous_queries_are_counted() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();

        let guided = finder.step_toward(&world, &ClearSkies, &TestAgent::npc(), 1, 99, false);
        assert_eq!(guided.step, NextStep::InvalidQuery);
        assert_eq!(finder.telemetry().invalid_queries, 1);
    }

    #[test]
    fn novice_trackers_fumble() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let novice = TestAgent::player().with_tracking(5);

        let report = finder
            .track(&world, &ClearSkies, &novice, 2, 3, false)
            .unwrap();
        assert!(report.fumbled);
        // Room 2 has viable exits both ways; the guess is one of them.
        match report.step {
            NextStep::Toward(dir) => {
                assert!(dir == Direction::East || dir == Direction::West);
            }
            other => panic!("fumble produced {other:?}"),
        }
        assert_eq!(finder.telemetry().fumbles, 1);
    }

    #[test]
    fn a_fumble_in_a_dead_end_finds_nothing() {
        let world = WorldBuilder::new().room(1, Sector::Inside).build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let novice = TestAgent::player().with_tracking(0);

        let report = finder
            .track(&world, &ClearSkies, &novice, 1, 1, false)
            .unwrap();
        assert!(report.fumbled);
        assert_eq!(report.step, NextStep::NoPath);
    }

    #[test]
    fn mid_skill_gets_the_cost_aware_router() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let journeyman = TestAgent::player().with_tracking(40);

        let report = finder
            .track(&world, &ClearSkies, &journeyman, 1, 3, true)
            .unwrap();
        assert_eq!(report.step, NextStep::Toward(Direction::East));
        assert_eq!(report.cost, 1);
        assert!(!report.fumbled);
        // The advanced flag alone does not unlock the deep search.
        assert_eq!(finder.telemetry().deep_searches, 0);
    }

    #[test]
    fn experts_with_the_advanced_flag_run_the_deep_search() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .room(3, Sector::Inside)
            .link_both(1, Direction::North, 3)
            .locked(1, Direction::East, 2, 40)
            .key(3, 40)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let expert = TestAgent::player().with_tracking(90);

        let report = finder
            .track(&world, &ClearSkies, &expert, 1, 2, true)
            .unwrap();
        assert_eq!(report.step, NextStep::Toward(Direction::North));
        assert_eq!(finder.telemetry().deep_searches, 1);

        // Without the flag the expert stays on the cheap router.
        let report = finder
            .track(&world, &ClearSkies, &expert, 1, 2, false)
            .unwrap();
        assert_eq!(report.step, NextStep::NoPath);
        assert_eq!(finder.telemetry().deep_searches, 1);
    }

    #[test]
    fn track_warns_when_the_budget_falls_short() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Mountains)
            .link_both(1, Direction::East, 2)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let weary = TestAgent::player().with_tracking(40).with_moves(2);

        let report = finder
            .track(&world, &ClearSkies, &weary, 1, 2, false)
            .unwrap();
        assert_eq!(report.step, NextStep::Toward(Direction::East));
        assert!(report.short_on_moves);
    }

    #[test]
    fn track_rejects_unknown_rooms() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let player = TestAgent::player();

        let err = finder
            .track(&world, &ClearSkies, &player, 1, 99, false)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRoom { room: 99 }));
        assert_eq!(finder.telemetry().invalid_queries, 1);
    }

    #[test]
    fn survey_is_an_expert_command() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();

        let journeyman = TestAgent::player().with_tracking(40);
        let report = finder
            .survey(&world, &ClearSkies, &journeyman, 1, 3, SurveyMode::Plain)
            .unwrap();
        assert!(report.refused);

        let expert = TestAgent::player().with_tracking(70);
        let report = finder
            .survey(&world, &ClearSkies, &expert, 1, 3, SurveyMode::Plain)
            .unwrap();
        assert!(!report.refused);
        assert_eq!(report.zone_path, Some(vec![0]));
    }

    #[test]
    fn survey_modes_fill_their_sections() {
        let world = WorldBuilder::new()
            .room(1, Sector::Inside)
            .room(2, Sector::Inside)
            .locked(1, Direction::East, 2, 31)
            .build();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let expert = TestAgent::player().with_tracking(95);

        let analyzed = finder
            .survey(&world, &ClearSkies, &expert, 1, 2, SurveyMode::Analyze)
            .unwrap();
        assert_eq!(analyzed.blocking_key, Some(31));
        assert_eq!(analyzed.required_keys, vec![31]);

        let compared = finder
            .survey(&world, &ClearSkies, &expert, 1, 2, SurveyMode::Compare)
            .unwrap();
        assert_eq!(compared.quick, Some((NextStep::NoPath, 0)));
        assert_eq!(compared.deep, Some((NextStep::NoPath, 0)));
        assert_eq!(finder.telemetry().deep_searches, 1);
    }

    #[test]
    fn reset_clears_cache_and_counters() {
        let world = hallway();
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let npc = TestAgent::npc();

        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(finder.telemetry().cache_hits, 1);

        finder.reset();
        assert_eq!(finder.telemetry(), &Telemetry::default());

        finder.step_toward(&world, &ClearSkies, &npc, 1, 3, false);
        assert_eq!(finder.telemetry().cache_hits, 0);
        assert_eq!(finder.telemetry().queries, 1);
    }

    #[test]
    fn telemetry_serializes_for_host_reporting() {
        let mut finder = Pathfinder::new(NavConfig::default()).unwrap();
        finder.begin_tick();
        let world = hallway();
        finder.step_toward(&world, &ClearSkies, &TestAgent::npc(), 1, 3, false);

        let json = serde_json::to_value(finder.telemetry()).unwrap();
        assert_eq!(json["queries"], 1);
        assert_eq!(json["cache_hits"], 0);
    }
}
