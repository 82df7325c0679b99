use rand::prelude::*;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    algorithms::best_sweep::best_sweep,
    models::instance::Instance,
    operators::{
        evaluation::{improves, Penalties},
        host_repository::HostRepository,
        initialisation::{InitPop, SweepInitialisation},
        mutation::{BetweenBranchesTransposon, Mutation, Plasmid, SingleBranchTransposon},
        neighbour_gen::{hill_climb, BestImprovingMove},
        selection::{OperatorKind, OperatorSelection},
        solution::Solution,
    },
    utilities::{metrics::CostSummary, stopwatch::Stopwatch},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TransgeneticParams {
    pub pop_size: usize,
    /// Size of the minimum spanning fragments seeding the host repository.
    pub host_branch_size: usize,
    pub prob_plasmid: f64,
    pub prob_sb_transposon: f64,
    pub generations: usize,
    pub seed: u64,
}

impl Default for TransgeneticParams {
    fn default() -> Self {
        TransgeneticParams {
            pop_size: 30,
            host_branch_size: 5,
            prob_plasmid: 0.3,
            prob_sb_transposon: 0.5,
            generations: 10,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GenerationStats {
    pub generation: usize,
    pub plasmids: usize,
    pub single_branch: usize,
    pub between_branches: usize,
    /// Individuals that ended the generation cheaper than they started it.
    pub updates: usize,
    /// Individuals restored to their layout before the operator.
    pub rollbacks: usize,
    /// Individuals that matched or beat the best cost seen so far.
    pub new_best: usize,
    /// Branches of those individuals new to the host repository.
    pub harvested: usize,
    pub host_repository: usize,
    pub costs: Option<CostSummary>,
    pub elapsed_secs: f64,
}

// Archives a random branch of `individual`. False if it held nothing new.
fn harvest<R: Rng>(individual: &Solution, host_repository: &mut HostRepository, rng: &mut R) -> bool {
    match individual.first_layer().choose(rng) {
        Some(&root) => host_repository.try_push(individual.cut_branch(root)),
        None => false,
    }
}

fn population_costs(population: &[Solution]) -> Option<CostSummary> {
    let costs: Vec<f64> = population.iter().map(|s| s.cost(false)).collect();
    CostSummary::new(&costs)
}

/**
    Transgenetic search over cable layouts.

    Each generation every individual receives either a plasmid, grafting a
    fragment from the host repository, or one of the two transposons. Worse
    results are rolled back. Individuals reaching the best cost seen so far
    feed one of their branches back into the host repository. After the last
    generation every individual is hill climbed and the cheapest is
    returned.
**/
pub fn run<'a>(
    instance: &'a Instance,
    penalties: Penalties,
    params: &TransgeneticParams,
    mut iteration_observer: impl FnMut(&GenerationStats, &[Solution<'a>]),
) -> Solution<'a> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let selection = OperatorSelection::new(params.prob_plasmid, params.prob_sb_transposon);

    let mut population = SweepInitialisation::new(instance, penalties).apply(params.pop_size);

    let seed_solution = Solution::new(instance, penalties, &best_sweep(instance, penalties));
    let mut host_repository = HostRepository::initialise(instance, params.host_branch_size, &seed_solution);

    let initial = population_costs(&population);
    let mut overall_best = initial.map_or(f64::INFINITY, |costs| costs.min);

    info!(
        instance = instance.name(),
        turbines = instance.n(),
        population = population.len(),
        host_repository = host_repository.len(),
        best_cost = overall_best,
        "population initialised"
    );

    for generation in 0..params.generations {
        let mut stopwatch = Stopwatch::new();
        stopwatch.start();

        let mut stats = GenerationStats {
            generation,
            ..GenerationStats::default()
        };

        for individual in population.iter_mut() {
            let cost = individual.cost(false);
            let edges = individual.get_edges();

            let mut kind = selection.select(&mut rng);
            if kind == OperatorKind::Plasmid && host_repository.is_empty() {
                kind = selection.select_transposon(&mut rng);
            }

            match kind {
                OperatorKind::Plasmid => {
                    if let Some(donor) = host_repository.choose(&mut rng) {
                        Plasmid::new(donor).apply(individual);
                    }
                    stats.plasmids += 1;
                }
                OperatorKind::SingleBranchTransposon => {
                    SingleBranchTransposon.apply(individual);
                    stats.single_branch += 1;
                }
                OperatorKind::BetweenBranchesTransposon => {
                    BetweenBranchesTransposon.apply(individual);
                    stats.between_branches += 1;
                }
            }

            let new_cost = individual.cost(false);
            if new_cost > cost {
                individual.build(&edges, false);
                stats.rollbacks += 1;
            } else if improves(new_cost, cost) {
                stats.updates += 1;
            }

            if !improves(overall_best, new_cost) {
                overall_best = overall_best.min(new_cost);
                stats.new_best += 1;

                if harvest(individual, &mut host_repository, &mut rng) {
                    stats.harvested += 1;
                }
            }
        }

        stats.host_repository = host_repository.len();
        stats.costs = population_costs(&population);
        stats.elapsed_secs = stopwatch.read();

        info!(
            generation = generation + 1,
            plasmids = stats.plasmids,
            single_branch = stats.single_branch,
            between_branches = stats.between_branches,
            updates = stats.updates,
            rollbacks = stats.rollbacks,
            new_best = stats.new_best,
            harvested = stats.harvested,
            host_repository = stats.host_repository,
            min_cost = stats.costs.map_or(f64::NAN, |c| c.min),
            mean_cost = stats.costs.map_or(f64::NAN, |c| c.mean),
            max_cost = stats.costs.map_or(f64::NAN, |c| c.max),
            elapsed_secs = stats.elapsed_secs,
            "generation finished"
        );

        iteration_observer(&stats, &population);
    }

    let mut stopwatch = Stopwatch::new();
    stopwatch.start();

    let moves: usize = population
        .par_iter_mut()
        .map(|individual| hill_climb(&BestImprovingMove, individual))
        .sum();

    debug!(moves, elapsed_secs = stopwatch.read(), "final hill climb");

    let best = population
        .into_iter()
        .min_by(|a, b| a.cost(false).total_cmp(&b.cost(false)));

    match best {
        Some(best) => {
            info!(
                cost = best.cost(false),
                crossings = best.crossing_count(),
                fanin = best.substation_fanin(),
                "transgenetic search finished"
            );
            best
        }
        None => seed_solution,
    }
}
