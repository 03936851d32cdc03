//! Population of agents and one round of self-play evolution.
//!
//! A round runs in four phases:
//!
//! 1. **Partition** - the population is split into equal contiguous groups;
//!    entities that do not fill a whole group sit the round out
//! 2. **Matches** - inside every group each ordered pair plays once, the first
//!    entity as white. Groups run on scoped threads and only read the agents
//! 3. **Selection** - each group is sorted by fitness (stable, best first) and its
//!    top `keep_best` entities become breeding stock
//! 4. **Regeneration** - a cursor walks the stock group by group, pairing each
//!    parent with a random second parent from any group, until the population is
//!    back to its original size
//!
//! Fitness is zero-sum inside a match: the adjusted score (final score divided by
//! the number of moves) is added to white and subtracted from black.

use std::{ops::Range, thread};

use gogo_agent::{Agent, AgentParams, NetworkError};
use gogo_engine::GameRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Recombination, TrainingError,
    matches::{self, MatchOutcome},
    stats::FitnessStats,
};

/// One population member.
///
/// `fitness` only covers the round in progress and is reset by regeneration, so a
/// saved population ranks its members by `parent_fitness`, the fitness the primary
/// parent earned in the round that bred this entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    agent: Agent,
    fitness: f32,
    #[serde(default)]
    parent_fitness: f32,
}

impl Entity {
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        Self::bred(agent, 0.0)
    }

    fn bred(agent: Agent, parent_fitness: f32) -> Self {
        Self {
            agent,
            fitness: 0.0,
            parent_fitness,
        }
    }

    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Fitness accumulated during the last round played.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Fitness of the parent this entity was bred from; zero for the first
    /// generation.
    #[must_use]
    pub fn parent_fitness(&self) -> f32 {
        self.parent_fitness
    }
}

/// Per-round settings taken from the training configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSettings {
    pub groups: usize,
    pub keep_best: usize,
    pub recombination: Recombination,
    pub max_moves: Option<usize>,
}

/// Match with the score closest to a draw in one group.
#[derive(Debug, Clone)]
pub struct Showcase {
    /// `group_<age>_<group>_<white>_<black>`, with in-group indices.
    pub name: String,
    pub adjusted_score: f32,
    pub record: GameRecord,
}

#[derive(Debug, Clone)]
pub struct GroupReport {
    pub best_fitness: f32,
    pub showcase: Option<Showcase>,
}

/// What happened during one round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// Age of the population that played the round.
    pub age: usize,
    pub groups: Vec<GroupReport>,
    /// Fitness of every entity that played.
    pub fitness: FitnessStats,
    /// Entities left out because they did not fill a whole group.
    pub sat_out: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    dimension: usize,
    age: usize,
    entities: Vec<Entity>,
}

impl Population {
    /// Creates a first generation of random agents.
    ///
    /// # Arguments
    ///
    /// * `dimension` - Board dimension every match of this population is played on
    /// * `size` - Number of entities
    /// * `params` - Network shape and mutation rates of the agents
    /// * `rng` - Source of the network parameters
    #[must_use]
    pub fn random<R>(dimension: usize, size: usize, params: &AgentParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let entities = (0..size)
            .map(|_| Entity::new(Agent::random(dimension, params, rng)))
            .collect();
        Self {
            dimension,
            age: 0,
            entities,
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of completed rounds.
    #[must_use]
    pub fn age(&self) -> usize {
        self.age
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities ordered best first by the fitness their parent earned.
    ///
    /// The sort is stable, so ties keep regeneration order. A first generation has
    /// no fitness yet and stays in creation order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Entity> {
        let mut ranked = self.entities.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.parent_fitness.total_cmp(&a.parent_fitness));
        ranked
    }

    /// Entity bred from the fittest parent of the last round.
    #[must_use]
    pub fn best(&self) -> Option<&Entity> {
        self.ranked().first().copied()
    }

    /// Splits the population into `groups` contiguous groups of equal size.
    ///
    /// Leftover entities at the end belong to no group.
    pub fn partition(&self, groups: usize) -> Result<Vec<Range<usize>>, TrainingError> {
        let group_size = self.entities.len().checked_div(groups).unwrap_or(0);
        if group_size == 0 {
            return Err(TrainingError::EmptyGroup {
                population: self.entities.len(),
                groups,
            });
        }
        Ok((0..groups)
            .map(|i| i * group_size..(i + 1) * group_size)
            .collect())
    }

    /// Plays one round and replaces the population with the next generation.
    ///
    /// Every ordered pair inside a group plays one match, groups run on scoped
    /// threads, and the top `keep_best` entities of each group breed the next
    /// generation. The returned report describes the generation that played.
    ///
    /// # Arguments
    ///
    /// * `settings` - Group count, breeding stock size, recombination and move limit
    /// * `rng` - Source of partner choices and mutations
    ///
    /// # Errors
    ///
    /// Fails without touching the population when the groups would be empty or
    /// `keep_best` does not fit a group, and when a network does not fit the board.
    pub fn play_round<R>(
        &mut self,
        settings: &RoundSettings,
        rng: &mut R,
    ) -> Result<RoundReport, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let groups = self.partition(settings.groups)?;
        let group_size = groups[0].len();
        if settings.keep_best == 0 || settings.keep_best > group_size {
            return Err(TrainingError::KeepBest {
                keep_best: settings.keep_best,
                group_size,
            });
        }
        let sat_out = self.entities.len() - group_size * groups.len();
        if sat_out > 0 {
            tracing::warn!(
                sat_out,
                population = self.entities.len(),
                groups = groups.len(),
                "population does not divide evenly into groups; leftover entities sit out"
            );
        }

        for entity in &mut self.entities {
            entity.fitness = 0.0;
        }

        let outcomes = self.play_groups(&groups, settings.max_moves)?;

        let mut reports = Vec::with_capacity(groups.len());
        for (group, (range, outcomes)) in groups.iter().zip(outcomes).enumerate() {
            for outcome in &outcomes {
                let adjusted = outcome.adjusted_score();
                self.entities[range.start + outcome.white].fitness += adjusted;
                self.entities[range.start + outcome.black].fitness -= adjusted;
            }

            let showcase = outcomes
                .into_iter()
                .min_by(|a, b| {
                    a.adjusted_score()
                        .abs()
                        .total_cmp(&b.adjusted_score().abs())
                })
                .map(|outcome| Showcase {
                    name: format!(
                        "group_{}_{group}_{}_{}",
                        self.age, outcome.white, outcome.black
                    ),
                    adjusted_score: outcome.adjusted_score(),
                    record: outcome.into_record(),
                });

            let members = &mut self.entities[range.clone()];
            members.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
            let best_fitness = members[0].fitness;
            tracing::debug!(group, best_fitness, "group finished");
            reports.push(GroupReport {
                best_fitness,
                showcase,
            });
        }

        let played = groups.iter().flat_map(|range| &self.entities[range.clone()]);
        let fitness = FitnessStats::new(played.map(|entity| entity.fitness))
            .ok_or(TrainingError::EmptyGroup {
                population: self.entities.len(),
                groups: groups.len(),
            })?;

        let report = RoundReport {
            age: self.age,
            groups: reports,
            fitness,
            sat_out,
        };

        self.regenerate(&groups, settings, rng)?;
        Ok(report)
    }

    /// Every ordered pair of each group plays one match; groups run in parallel.
    fn play_groups(
        &self,
        groups: &[Range<usize>],
        max_moves: Option<usize>,
    ) -> Result<Vec<Vec<MatchOutcome>>, NetworkError> {
        let dimension = self.dimension;
        thread::scope(|s| {
            let handles: Vec<_> = groups
                .iter()
                .map(|range| {
                    let members = &self.entities[range.clone()];
                    s.spawn(move || play_group(members, dimension, max_moves))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    /// Rebuilds the population from each group's top `keep_best` entities.
    ///
    /// Expects every group to be sorted best first.
    fn regenerate<R>(
        &mut self,
        groups: &[Range<usize>],
        settings: &RoundSettings,
        rng: &mut R,
    ) -> Result<(), NetworkError>
    where
        R: Rng + ?Sized,
    {
        let stock: Vec<&[Entity]> = groups
            .iter()
            .map(|range| &self.entities[range.start..range.start + settings.keep_best])
            .collect();

        let size = self.entities.len();
        let mut next = Vec::with_capacity(size);
        let (mut group, mut rank) = (0, 0);
        while next.len() < size {
            let parent = &stock[group][rank];
            let first = &parent.agent;
            let partner_group = rng.random_range(0..stock.len());
            let partner_rank = rng.random_range(0..settings.keep_best);
            let second = &stock[partner_group][partner_rank].agent;
            let child = match settings.recombination {
                Recombination::Asexual => first.offspring(rng),
                Recombination::Uniform => first.crossover(second, rng)?,
            };
            next.push(Entity::bred(child, parent.fitness));

            group += 1;
            if group == stock.len() {
                group = 0;
                rank = (rank + 1) % settings.keep_best;
            }
        }

        self.entities = next;
        self.age += 1;
        Ok(())
    }
}

fn play_group(
    members: &[Entity],
    dimension: usize,
    max_moves: Option<usize>,
) -> Result<Vec<MatchOutcome>, NetworkError> {
    let mut outcomes = Vec::with_capacity(members.len() * members.len().saturating_sub(1));
    for (i, white) in members.iter().enumerate() {
        for (j, black) in members.iter().enumerate() {
            if i == j {
                continue;
            }
            outcomes.push(matches::play_match(
                (i, &white.agent),
                (j, &black.agent),
                dimension,
                max_moves,
            )?);
        }
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use gogo_agent::Activation;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn params() -> AgentParams {
        AgentParams {
            activation: Activation::Sigmoid,
            hidden_layers: vec![8],
            mutation_rate: 0.9,
            stabilization_rate: 0.1,
        }
    }

    fn settings(groups: usize, keep_best: usize) -> RoundSettings {
        RoundSettings {
            groups,
            keep_best,
            recombination: Recombination::Asexual,
            max_moves: Some(60),
        }
    }

    #[test]
    fn test_partition() {
        let mut rng = Pcg32::seed_from_u64(1);
        let population = Population::random(3, 7, &params(), &mut rng);
        assert_eq!(population.partition(3).unwrap(), [0..2, 2..4, 4..6]);
        assert_eq!(population.partition(1).unwrap(), [0..7]);
        assert_eq!(population.partition(7).unwrap().len(), 7);
        assert!(matches!(
            population.partition(8),
            Err(TrainingError::EmptyGroup {
                population: 7,
                groups: 8
            })
        ));
        assert!(population.partition(0).is_err());
    }

    #[test]
    fn test_round_keeps_size_and_ages() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut population = Population::random(3, 6, &params(), &mut rng);
        let report = population.play_round(&settings(2, 2), &mut rng).unwrap();

        assert_eq!(population.len(), 6);
        assert_eq!(population.age(), 1);
        assert_eq!(report.age, 0);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.sat_out, 0);
        assert!(report.groups.iter().all(|group| group.showcase.is_some()));
        assert!(
            report.groups[0]
                .showcase
                .as_ref()
                .is_some_and(|showcase| showcase.name.starts_with("group_0_0_"))
        );
        // zero-sum matches
        assert!(report.fitness.mean.abs() < 1e-4);
        assert!(population.entities().iter().all(|e| e.fitness() == 0.0));
    }

    #[test]
    fn test_round_with_leftovers_and_crossover() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut population = Population::random(3, 5, &params(), &mut rng);
        let settings = RoundSettings {
            recombination: Recombination::Uniform,
            ..settings(2, 1)
        };
        let report = population.play_round(&settings, &mut rng).unwrap();
        assert_eq!(report.sat_out, 1);
        assert_eq!(population.len(), 5);
        assert_eq!(population.age(), 1);
    }

    #[test]
    fn test_keep_best_larger_than_group() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut population = Population::random(3, 4, &params(), &mut rng);
        let before = population.clone();
        assert!(matches!(
            population.play_round(&settings(2, 3), &mut rng),
            Err(TrainingError::KeepBest {
                keep_best: 3,
                group_size: 2
            })
        ));
        assert_eq!(population, before);
    }

    #[test]
    fn test_regenerate_breeds_from_stock_only() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut population = Population::random(3, 4, &params(), &mut rng);
        let best = &mut population.entities[0];
        best.agent = Agent::new(best.agent.network().clone(), 0.5, 0.5);

        let groups = population.partition(1).unwrap();
        population
            .regenerate(&groups, &settings(1, 1), &mut rng)
            .unwrap();
        assert_eq!(population.len(), 4);
        assert!(
            population
                .entities()
                .iter()
                .all(|e| (e.agent().mutation_rate() - 0.25).abs() < 1e-6)
        );
    }

    #[test]
    fn test_next_generation_keeps_parent_ranking() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut population = Population::random(3, 6, &params(), &mut rng);
        assert!(population.entities().iter().all(|e| e.parent_fitness() == 0.0));

        let report = population.play_round(&settings(2, 2), &mut rng).unwrap();
        let best = population.best().unwrap();
        assert_eq!(best.parent_fitness(), report.fitness.max);
        assert_eq!(
            best.parent_fitness(),
            report
                .groups
                .iter()
                .map(|group| group.best_fitness)
                .fold(f32::NEG_INFINITY, f32::max)
        );

        let ranked = population.ranked();
        assert_eq!(ranked.len(), 6);
        assert!(
            ranked
                .windows(2)
                .all(|pair| pair[0].parent_fitness() >= pair[1].parent_fitness())
        );
        // the first child of every group descends from that group's best
        for (group, report) in report.groups.iter().enumerate() {
            assert_eq!(population.entities()[group].parent_fitness(), report.best_fitness);
        }
    }
}
