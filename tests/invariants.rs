//! Property tests for the rules that must hold on every input.

use glam::Vec2;
use proptest::prelude::*;

use tank_arena::Tuning;
use tank_arena::consts::*;
use tank_arena::sim::{
    GameState, Shape, ShapeKind, StatAllocation, StatSlot, TickInput, closest_point_on_segment,
    derive_stats, level_for_xp, penetration_damage, point_in_polygon, polygon_vertices, tick,
    total_skill_points_for_level, xp_for_level,
};

fn arb_slot() -> impl Strategy<Value = StatSlot> {
    (0..STAT_SLOTS).prop_map(|i| StatSlot::ALL[i])
}

fn arb_input() -> impl Strategy<Value = TickInput> {
    (
        -1.5f32..1.5,
        -1.5f32..1.5,
        proptest::option::of((-500.0f32..500.0, -500.0f32..500.0)),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(mx, my, aim, fire_held, fire_pressed)| TickInput {
            movement: Vec2::new(mx, my),
            aim: aim.map(|(x, y)| Vec2::new(2000.0 + x, 2000.0 + y)),
            fire_held,
            fire_pressed,
            autopilot: false,
        })
}

proptest! {
    #[test]
    fn allocation_never_breaks_the_rules(
        level in 1u32..=MAX_LEVEL,
        slots in proptest::collection::vec(arb_slot(), 0..80),
    ) {
        let mut alloc = StatAllocation::default();
        for slot in slots {
            alloc.try_allocate(slot, level);
            prop_assert!(alloc.spent() <= total_skill_points_for_level(level));
            prop_assert!(alloc.maxed_slots() <= MAX_MAXED_SLOTS);
            prop_assert!(alloc.points().iter().all(|&p| p <= MAX_STAT_VALUE));
        }
    }

    #[test]
    fn derive_stats_is_pure(
        level in 0u32..60,
        points in proptest::array::uniform8(0u8..=MAX_STAT_VALUE),
    ) {
        let alloc = StatAllocation::from_points(points).expect("in range");
        let a = derive_stats(level, &alloc);
        let b = derive_stats(level, &alloc);
        prop_assert_eq!(a, b);
        prop_assert!(a.max_health > 0.0);
        prop_assert!(a.reload_ticks >= 1);
        prop_assert!(a.move_speed > 0.0);
    }

    #[test]
    fn skill_points_are_monotonic(level in 1u32..MAX_LEVEL) {
        let now = total_skill_points_for_level(level);
        let next = total_skill_points_for_level(level + 1);
        prop_assert!(next >= now);
        prop_assert!(next - now <= 1);
        prop_assert!(next <= MAX_SKILL_POINTS);
    }

    #[test]
    fn level_matches_xp_thresholds(xp in 0u64..200_000) {
        let level = level_for_xp(xp);
        prop_assert!((1..=MAX_LEVEL).contains(&level));
        prop_assert!(xp_for_level(level) <= xp);
        if level < MAX_LEVEL {
            prop_assert!(xp < xp_for_level(level + 1));
        }
    }

    #[test]
    fn penetration_never_exceeds_damage(
        damage in 0.0f32..100.0,
        bullet_hp in -10.0f32..50.0,
        resistance in 0.5f32..10.0,
    ) {
        let dealt = penetration_damage(damage, bullet_hp, resistance);
        prop_assert!(dealt >= 0.0);
        prop_assert!(dealt <= damage);
        if bullet_hp >= resistance {
            prop_assert_eq!(dealt, damage);
        }
    }

    #[test]
    fn closest_point_stays_on_segment(
        ax in -100.0f32..100.0, ay in -100.0f32..100.0,
        bx in -100.0f32..100.0, by in -100.0f32..100.0,
        px in -200.0f32..200.0, py in -200.0f32..200.0,
    ) {
        let (a, b, p) = (Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(px, py));
        let c = closest_point_on_segment(p, a, b);
        prop_assert!(c.distance(p) <= a.distance(p) + 1e-3);
        prop_assert!(c.distance(p) <= b.distance(p) + 1e-3);
    }

    #[test]
    fn polygon_contains_its_center(
        angle in -3.2f32..3.2,
        cx in 0.0f32..4000.0,
        cy in 0.0f32..4000.0,
        kind in prop_oneof![Just(ShapeKind::Square), Just(ShapeKind::Triangle)],
    ) {
        let center = Vec2::new(cx, cy);
        let poly = polygon_vertices(&Shape::from_kind(kind, kind.base_size()), center, angle);
        prop_assert!(point_in_polygon(center, poly.vertices()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ticks_keep_health_and_population_in_bounds(
        seed in any::<u64>(),
        inputs in proptest::collection::vec(arb_input(), 1..120),
        dt in 0.0f32..0.2,
    ) {
        let mut state = GameState::with_seed(Tuning::default(), seed);
        let mut effects = Vec::new();
        for input in &inputs {
            tick(&mut state, input, dt, &mut effects);

            let max_health = state.derived().max_health;
            prop_assert!(state.tank.hp >= 0.0 && state.tank.hp <= max_health);
            for entity in &state.entities {
                prop_assert!(entity.hp > 0.0 && entity.hp <= entity.max_hp);
            }
            for kind in ShapeKind::ALL {
                prop_assert!(state.count_of(kind) <= state.tuning.cap_for(kind));
            }
            prop_assert!(effects.iter().all(|e| e.remaining > 0.0));
        }
    }
}
