//! Force-directed relaxation.
//!
//! Bodies start from the seeded random layout. Each iteration computes
//! every force from the current positions, then moves bodies in index
//! order; a move is kept only if the moved rectangle is still valid.
//!
//! Forces:
//! - wall attraction, proportional to the gap to the nearest wall (off
//!   inside the near-entrance zone)
//! - unit and obstacle repulsion while the clear separation is below one
//!   corridor width

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::primitives::{Point, Rect};

use super::{random_layout, Ilot, PlacementContext, StrategyRun};

#[derive(Debug, Clone, Copy, Default)]
struct ForceSample {
    force: Point,
    energy: f64,
}

fn wall_pull(ctx: &PlacementContext, rect: &Rect) -> ForceSample {
    if ctx.geometry.rect_near_entrance(rect) {
        return ForceSample::default();
    }
    let center = rect.center();
    let Some(target) = ctx.geometry.nearest_wall_point(center) else {
        return ForceSample::default();
    };
    let gap = ctx
        .geometry
        .walls()
        .iter()
        .map(|w| rect.distance_to_segment(w.start, w.end))
        .fold(f64::INFINITY, f64::min);
    if !gap.is_finite() || gap <= ctx.config.wall_contact_tolerance {
        return ForceSample::default();
    }
    let k = ctx.config.force.wall_attraction;
    let dir = target.sub(center).normalized().unwrap_or_default();
    ForceSample {
        force: dir.scale(k * gap),
        energy: 0.5 * k * gap * gap,
    }
}

/// Push `from` away from `other`; ties on coincident centers break on index.
fn push_direction(from: Point, other: Point, tie: f64) -> Point {
    from.sub(other)
        .normalized()
        .unwrap_or(Point::new(tie, 0.0))
}

fn compute_forces(ctx: &PlacementContext, bodies: &[Ilot]) -> (Vec<Point>, f64) {
    let params = &ctx.config.force;
    let s0 = ctx.corridor_width;
    let mut forces = vec![Point::default(); bodies.len()];
    let mut energy = 0.0;

    for (i, body) in bodies.iter().enumerate() {
        let wall = wall_pull(ctx, &body.rect);
        forces[i] = forces[i].add(wall.force);
        energy += wall.energy;

        for (j, other) in bodies.iter().enumerate().skip(i + 1) {
            let s = body.rect.separation(&other.rect).max(0.0);
            if s >= s0 {
                continue;
            }
            let magnitude = params.unit_repulsion * (s0 - s);
            let dir = push_direction(body.center(), other.center(), -1.0);
            forces[i] = forces[i].add(dir.scale(magnitude));
            forces[j] = forces[j].add(dir.scale(-magnitude));
            energy += 0.5 * params.unit_repulsion * (s0 - s) * (s0 - s);
        }

        for obstacle in ctx.geometry.obstacles() {
            let s = obstacle.polygon.distance_to_rect(&body.rect);
            if s >= s0 {
                continue;
            }
            let magnitude = params.obstacle_repulsion * (s0 - s);
            let dir = push_direction(body.center(), obstacle.bounds.center(), 1.0);
            forces[i] = forces[i].add(dir.scale(magnitude));
            energy += 0.5 * params.obstacle_repulsion * (s0 - s) * (s0 - s);
        }
    }
    (forces, energy)
}

fn translated(rect: &Rect, d: Point) -> Rect {
    Rect::new(rect.x + d.x, rect.y + d.y, rect.width, rect.height)
}

pub fn place(ctx: &PlacementContext, target: f64) -> StrategyRun {
    if ctx.specs.is_empty() || target <= 0.0 {
        return StrategyRun::default();
    }
    let params = &ctx.config.force;
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.config.seed);
    let mut bodies = random_layout(ctx, target, &mut rng);
    let mut iteration = 0u32;
    let mut partial = false;

    while iteration < params.max_iterations {
        if ctx.deadline.expired() {
            partial = true;
            break;
        }
        let (forces, energy) = compute_forces(ctx, &bodies);
        iteration += 1;
        if energy < params.energy_threshold {
            log::debug!("force layout converged after {} iteration(s)", iteration);
            break;
        }

        let mut moved = false;
        for i in 0..bodies.len() {
            let mut d = forces[i].scale(params.step);
            let len = d.length();
            if len <= 1e-9 || !len.is_finite() {
                continue;
            }
            if len > params.max_step {
                d = d.scale(params.max_step / len);
            }
            let candidate = translated(&bodies[i].rect, d);
            let clear = ctx.geometry.rect_fits(&candidate)
                && bodies
                    .iter()
                    .enumerate()
                    .all(|(j, b)| j == i || !b.rect.overlaps(&candidate));
            if clear {
                bodies[i].rect = candidate;
                moved = true;
            }
        }
        if !moved {
            log::debug!("force layout settled after {} iteration(s)", iteration);
            break;
        }
    }

    StrategyRun {
        ilots: bodies,
        partial,
        rounds: iteration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, IlotSpec};
    use crate::config::LayoutConfig;
    use crate::geometry::{ClassifiedGeometry, GeometryModel};
    use crate::placement::Deadline;
    use std::time::Duration;

    fn config() -> LayoutConfig {
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(2.0, 2.0), IlotSpec::new(3.0, 2.0)]);
        config.force.max_iterations = 30;
        config
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = config();
        let raw = ClassifiedGeometry::rectangle(12.0, 10.0).with_entrance([6.0, 0.0], [0.0, 1.0], None);
        let g = GeometryModel::new(&raw, &config).unwrap();
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        let a = place(&ctx, 0.25);
        let b = place(&ctx, 0.25);
        assert_eq!(a.ilots, b.ilots);
    }

    #[test]
    fn test_moves_keep_layout_valid() {
        let config = config();
        let raw = ClassifiedGeometry::rectangle(12.0, 10.0)
            .with_entrance([6.0, 0.0], [0.0, 1.0], None)
            .with_restricted(vec![[5.0, 5.0], [7.0, 5.0], [7.0, 7.0], [5.0, 7.0]]);
        let g = GeometryModel::new(&raw, &config).unwrap();
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        let run = place(&ctx, 0.25);
        assert!(!run.ilots.is_empty());
        for (i, a) in run.ilots.iter().enumerate() {
            assert!(g.rect_fits(&a.rect), "{:?}", a.rect);
            for b in &run.ilots[i + 1..] {
                assert!(!a.rect.overlaps(&b.rect));
            }
        }
    }

    #[test]
    fn test_single_body_drifts_to_wall() {
        let config = config();
        let g = GeometryModel::new(&ClassifiedGeometry::rectangle(12.0, 10.0), &config).unwrap();
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        let body = Rect::new(4.0, 4.0, 2.0, 2.0);
        let before = wall_pull(&ctx, &body);
        assert!(before.energy > 0.0);
        let after = translated(&body, before.force.scale(0.1));
        assert!(wall_pull(&ctx, &after).energy < before.energy);
    }

    #[test]
    fn test_expired_deadline_is_partial() {
        let config = config();
        let g = GeometryModel::new(&ClassifiedGeometry::rectangle(12.0, 10.0), &config).unwrap();
        let ctx = PlacementContext::new(&g, &config, Deadline::after(Some(Duration::ZERO)));
        let run = place(&ctx, 0.25);
        assert!(run.partial);
        assert_eq!(run.rounds, 0);
    }
}
