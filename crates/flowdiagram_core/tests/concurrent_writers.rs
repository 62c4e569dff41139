use flowdiagram_core::db::open_db;
use flowdiagram_core::{
    BlueprintRepository, Diagram, DiagramRepository, EntityId, Gateway, GatewayRegistry, UserId,
};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;
use std::sync::{Barrier, Mutex};
use std::thread;
use uuid::Uuid;

const ROUNDS: usize = 16;

type Outcome = Result<EntityId, String>;

/// Runs `op` on two connections to the same file, released together each
/// round. After both writers finish a round, the first connection runs
/// `observe`. Write failures are recorded, not raised, so one side cannot
/// leave the other parked on the barrier.
fn race_rounds<Op, Observe, T>(
    path: &Path,
    op: Op,
    observe: Observe,
) -> (Vec<[Outcome; 2]>, Vec<T>)
where
    Op: Fn(usize, usize, &GatewayRegistry) -> Outcome + Sync,
    Observe: Fn(&GatewayRegistry) -> T + Sync,
    T: Send,
{
    let barrier = Barrier::new(2);
    let outcomes: Mutex<Vec<[Outcome; 2]>> = Mutex::new(
        (0..ROUNDS)
            .map(|_| [Err("not run".to_string()), Err("not run".to_string())])
            .collect(),
    );
    let observed: Mutex<Vec<T>> = Mutex::new(Vec::new());

    let connections = [open_db(path).unwrap(), open_db(path).unwrap()];
    thread::scope(|scope| {
        let workers: Vec<_> = connections
            .into_iter()
            .enumerate()
            .map(|(side, conn)| {
                let (barrier, outcomes, observed) = (&barrier, &outcomes, &observed);
                let (op, observe) = (&op, &observe);
                scope.spawn(move || {
                    let registry = GatewayRegistry::from_connection(conn);
                    for round in 0..ROUNDS {
                        barrier.wait();
                        let outcome = op(side, round, &registry);
                        if let Ok(mut slots) = outcomes.lock() {
                            slots[round][side] = outcome;
                        }
                        barrier.wait();
                        if side == 0 {
                            let value = observe(&registry);
                            if let Ok(mut values) = observed.lock() {
                                values.push(value);
                            }
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
    });

    (outcomes.into_inner().unwrap(), observed.into_inner().unwrap())
}

fn default_ids(conn: &Connection, user_id: UserId, blueprint_id: EntityId) -> Vec<EntityId> {
    let mut stmt = conn
        .prepare(
            "SELECT id FROM diagram
             WHERE user_id = ?1 AND blueprint_id = ?2 AND user_default = 1
             ORDER BY id;",
        )
        .unwrap();
    stmt.query_map([user_id.to_string(), blueprint_id.to_string()], |row| {
            row.get::<_, String>(0)
        })
        .unwrap()
        .map(|text| Uuid::parse_str(&text.unwrap()).unwrap())
        .collect()
}

fn seed_blueprint(path: &Path, name: &str) -> EntityId {
    GatewayRegistry::from_connection(open_db(path).unwrap())
        .blueprints()
        .save_blueprint(&json!({ "name": name }))
        .unwrap()
        .id
}

#[test]
fn racing_blueprint_saves_store_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    let (outcomes, _) = race_rounds(
        &path,
        |_, round, registry| {
            let spec = json!({ "name": format!("race-{round}"), "nodes": [{"id": "1"}] });
            registry
                .blueprints()
                .save_blueprint(&spec)
                .map(|blueprint| blueprint.id)
                .map_err(|err| err.to_string())
        },
        |_| (),
    );

    for (round, [left, right]) in outcomes.iter().enumerate() {
        let left = left.as_ref().unwrap();
        let right = right.as_ref().unwrap();
        assert_eq!(left, right, "round {round} produced two blueprints");
    }
    let registry = GatewayRegistry::from_connection(open_db(&path).unwrap());
    assert_eq!(registry.blueprints().count().unwrap(), ROUNDS as i64);
}

#[test]
fn racing_set_default_leaves_one_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let user = Uuid::new_v4();
    let blueprint = seed_blueprint(&path, "scope");

    let setup = GatewayRegistry::from_connection(open_db(&path).unwrap());
    let mut candidates = [Uuid::nil(); 2];
    for slot in candidates.iter_mut() {
        let mut diagram = Diagram::new("Test", Some(user), "<xml/>");
        diagram.blueprint_id = Some(blueprint);
        *slot = setup.diagrams().create(&diagram).unwrap().id;
    }
    drop(setup);

    let (outcomes, observed) = race_rounds(
        &path,
        |side, _, registry| {
            registry
                .diagrams()
                .set_default(candidates[side])
                .map(|diagram| diagram.id)
                .map_err(|err| err.to_string())
        },
        |registry| default_ids(registry.connection(), user, blueprint),
    );

    for (round, [left, right]) in outcomes.iter().enumerate() {
        assert!(left.is_ok() && right.is_ok(), "round {round}: {left:?} {right:?}");
    }
    assert_eq!(observed.len(), ROUNDS);
    for (round, defaults) in observed.iter().enumerate() {
        assert_eq!(defaults.len(), 1, "round {round} left {defaults:?}");
        assert!(candidates.contains(&defaults[0]));
    }
}

#[test]
fn racing_default_saves_leave_one_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let user = Uuid::new_v4();
    let blueprint = seed_blueprint(&path, "saves");

    let (outcomes, observed) = race_rounds(
        &path,
        |side, round, registry| {
            let name = format!("round-{round}-side-{side}");
            let mut diagram = Diagram::new(name, Some(user), "<xml/>");
            diagram.blueprint_id = Some(blueprint);
            diagram.user_default = true;
            registry
                .diagrams()
                .save_diagram(&diagram)
                .map(|saved| saved.id)
                .map_err(|err| err.to_string())
        },
        |registry| default_ids(registry.connection(), user, blueprint),
    );

    for (round, (pair, defaults)) in outcomes.iter().zip(observed.iter()).enumerate() {
        let saved: Vec<EntityId> = pair
            .iter()
            .map(|outcome| *outcome.as_ref().unwrap())
            .collect();
        assert_eq!(defaults.len(), 1, "round {round} left {defaults:?}");
        assert!(saved.contains(&defaults[0]));
    }
}
