use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    iter,
};

use keyplay_core::{CellCoord, Command, Event, GameKind, GameOutcome, Key, NamedKey};
use keyplay_system_keylog::{decode_log, encode_keys, sign_log};
use keyplay_world::{self as world, query, World, WorldConfig};

#[test]
fn snake_replay_is_deterministic() {
    let first = replay(GameKind::Snake, snake_script());
    let second = replay(GameKind::Snake, snake_script());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn creature_replay_is_deterministic() {
    let script = repeat(NamedKey::ArrowRight, 13);
    let first = replay(GameKind::Creatures, script.clone());
    let second = replay(GameKind::Creatures, script);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn signed_snake_log_reaches_candy_and_crashes_on_the_floor() {
    let signed = sign_log(&encode_keys(&snake_script()));
    let keys = decode_log(&signed).expect("signed log decodes").into_keys();
    let outcome = replay(GameKind::Snake, keys);

    assert_eq!(outcome.turns, 38);
    assert_eq!(
        outcome.status,
        "Length: 4 Turns: 38. Metric: 0.421. Ouch, my nose!"
    );
    assert_eq!(
        outcome.events.last(),
        Some(&Event::GameEnded {
            outcome: GameOutcome::Crashed
        })
    );
}

#[test]
fn blank_log_line_still_ticks_a_turn() {
    let keys = decode_log(&sign_log("129\n\n129"))
        .expect("signed log decodes")
        .into_keys();
    let outcome = replay(GameKind::Snake, keys);

    assert_eq!(outcome.turns, 3);
    assert_eq!(
        outcome.body,
        vec![
            CellCoord::new(2, 5),
            CellCoord::new(3, 5),
            CellCoord::new(4, 5)
        ]
    );
}

#[test]
fn creature_session_eats_the_boar() {
    let outcome = replay(GameKind::Creatures, repeat(NamedKey::ArrowRight, 13));

    assert_eq!(outcome.status, "Turn 13. Player has 230 cals. Ate the Boar");
    assert_eq!(outcome.remaining, 13);
}

#[test]
fn pacing_back_and_forth_starves_the_player() {
    let script: Vec<Key> = [NamedKey::ArrowLeft, NamedKey::ArrowRight]
        .into_iter()
        .cycle()
        .take(30)
        .map(Key::Named)
        .collect();
    let outcome = replay(GameKind::Creatures, script);

    assert_eq!(outcome.turns, 24);
    assert_eq!(
        outcome.status,
        "Turn 24. Player has 0 cals. Having starved, player dies."
    );
    assert_eq!(
        outcome.events.last(),
        Some(&Event::GameEnded {
            outcome: GameOutcome::Starved
        })
    );
}

fn replay(kind: GameKind, keys: Vec<Key>) -> ReplayOutcome {
    let mut world = World::new(WorldConfig::new(kind));
    let mut events = Vec::new();

    for key in keys {
        world::apply(&mut world, Command::PressKey { key }, &mut events);
    }

    ReplayOutcome {
        status: query::status_line(&world),
        turns: query::turn_count(&world),
        body: query::snake(&world)
            .map(|snake| snake.body)
            .unwrap_or_default(),
        remaining: query::creatures(&world).len(),
        events,
    }
}

/// Right along row 5 to the first candy column, down onto the candy, then
/// down into the bottom wall.
fn snake_script() -> Vec<Key> {
    let mut keys = repeat(NamedKey::ArrowRight, 23);
    keys.extend(repeat(NamedKey::ArrowDown, 15));
    keys
}

fn repeat(named: NamedKey, count: usize) -> Vec<Key> {
    iter::repeat(Key::Named(named)).take(count).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    status: String,
    turns: u32,
    body: Vec<CellCoord>,
    remaining: usize,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
