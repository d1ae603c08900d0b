//! Genetic search over layouts.
//!
//! A chromosome is a sequence of [`Gene`]s decoded left to right: a gene that
//! is statically invalid or overlaps an earlier accepted gene counts as one
//! violation and is skipped. Fitness rewards closeness to the coverage target
//! and wall contact, and penalizes violations.
//!
//! Fitness is evaluated in parallel with rayon. The population is then
//! ordered by `(fitness desc, index asc)`, and every random draw happens on
//! the calling thread, so results depend only on the seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::{gene_budget, random_gene, Gene, Ilot, LayoutBuilder, PlacementContext, StrategyRun};

type Chromosome = Vec<Gene>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Evaluation {
    fitness: f64,
    coverage: f64,
}

fn decode(ctx: &PlacementContext, genes: &[Gene]) -> (Vec<Ilot>, usize) {
    let mut builder = LayoutBuilder::new(ctx);
    let mut violations = 0;
    for gene in genes {
        if !builder.try_place(gene.spec, gene.rotation, gene.rect(ctx)) {
            violations += 1;
        }
    }
    (builder.into_ilots(), violations)
}

fn evaluate(ctx: &PlacementContext, genes: &[Gene], target: f64) -> Evaluation {
    let (ilots, violations) = decode(ctx, genes);
    let area: f64 = ilots.iter().map(Ilot::area).sum();
    let coverage = super::coverage_of(area, ctx.usable_area());
    let closeness = 1.0 - (coverage - target).abs() / target;
    let wall_fraction = if ilots.is_empty() {
        0.0
    } else {
        ilots
            .iter()
            .filter(|i| ctx.geometry.touches_wall(&i.rect))
            .count() as f64
            / ilots.len() as f64
    };
    let params = &ctx.config.genetic;
    Evaluation {
        fitness: closeness - params.violation_penalty * violations as f64
            + params.wall_bonus * wall_fraction,
        coverage,
    }
}

fn tournament(rng: &mut impl Rng, evals: &[Evaluation], size: usize) -> usize {
    let mut best = rng.gen_range(0..evals.len());
    for _ in 1..size.max(1) {
        let challenger = rng.gen_range(0..evals.len());
        let (a, b) = (evals[challenger].fitness, evals[best].fitness);
        if a > b || (a == b && challenger < best) {
            best = challenger;
        }
    }
    best
}

/// One-point crossover with an independent cut on each parent.
fn crossover(rng: &mut impl Rng, a: &[Gene], b: &[Gene]) -> Chromosome {
    let cut_a = rng.gen_range(0..=a.len());
    let cut_b = rng.gen_range(0..=b.len());
    let mut child = a[..cut_a].to_vec();
    child.extend_from_slice(&b[cut_b..]);
    child
}

fn mutate(ctx: &PlacementContext, rng: &mut impl Rng, genes: &mut Chromosome, parent_coverage: f64, target: f64) {
    let params = &ctx.config.genetic;
    let bounds = ctx.geometry.bounds();
    let n_specs = ctx.specs.len();
    for gene in genes.iter_mut() {
        if !rng.gen_bool(params.mutation_rate.clamp(0.0, 1.0)) {
            continue;
        }
        match rng.gen_range(0..3) {
            0 => {
                let step = params.mutation_step.abs();
                gene.x += super::uniform(rng, -step, step);
                gene.y += super::uniform(rng, -step, step);
            }
            1 => gene.rotation = gene.rotation.flipped(),
            _ => gene.spec = rng.gen_range(0..n_specs),
        }
        let (w, h) = ctx.specs[gene.spec].1.footprint(gene.rotation);
        gene.x = gene.x.clamp(bounds.min_x(), (bounds.max_x() - w).max(bounds.min_x()));
        gene.y = gene.y.clamp(bounds.min_y(), (bounds.max_y() - h).max(bounds.min_y()));
    }
    if parent_coverage < target {
        let at = rng.gen_range(0..=genes.len());
        genes.insert(at, random_gene(ctx, rng));
    } else if parent_coverage > target && !genes.is_empty() {
        let at = rng.gen_range(0..genes.len());
        genes.remove(at);
    }
}

pub fn place(ctx: &PlacementContext, target: f64) -> StrategyRun {
    if ctx.specs.is_empty() || target <= 0.0 {
        return StrategyRun::default();
    }
    let params = &ctx.config.genetic;
    let pop_size = params.population_size.max(2);
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.config.seed);
    let budget = gene_budget(ctx, target);

    let mut population: Vec<Chromosome> = (0..pop_size)
        .map(|_| (0..budget).map(|_| random_gene(ctx, &mut rng)).collect())
        .collect();

    let mut best: Option<(f64, Chromosome)> = None;
    let mut plateau = 0u32;
    let mut generation = 0u32;
    let mut partial = false;

    while generation < params.max_generations.max(1) {
        let evals: Vec<Evaluation> = population
            .par_iter()
            .map(|genes| evaluate(ctx, genes, target))
            .collect();
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| evals[b].fitness.total_cmp(&evals[a].fitness).then(a.cmp(&b)));
        generation += 1;

        let leader = order[0];
        let improved = best
            .as_ref()
            .map_or(true, |(f, _)| evals[leader].fitness > *f + 1e-9);
        if improved {
            best = Some((evals[leader].fitness, population[leader].clone()));
            plateau = 0;
        } else {
            plateau += 1;
        }
        if generation % 10 == 0 {
            log::debug!(
                "generation {}: best fitness {:.4}, coverage {:.3}",
                generation,
                evals[leader].fitness,
                evals[leader].coverage
            );
        }
        if plateau >= params.plateau_window.max(1) {
            break;
        }
        if ctx.deadline.expired() {
            partial = true;
            break;
        }

        let elite = ((pop_size as f64 * params.elite_fraction).ceil() as usize).clamp(1, pop_size);
        let mut next: Vec<Chromosome> = order[..elite]
            .iter()
            .map(|&i| population[i].clone())
            .collect();
        while next.len() < pop_size {
            let a = tournament(&mut rng, &evals, params.tournament_size);
            let b = tournament(&mut rng, &evals, params.tournament_size);
            let mut child = crossover(&mut rng, &population[a], &population[b]);
            if child.is_empty() {
                child.push(random_gene(ctx, &mut rng));
            }
            mutate(ctx, &mut rng, &mut child, evals[a].coverage, target);
            next.push(child);
        }
        population = next;
    }

    let ilots = best
        .map(|(_, genes)| decode(ctx, &genes).0)
        .unwrap_or_default();
    StrategyRun {
        ilots,
        partial,
        rounds: generation,
    }
}
