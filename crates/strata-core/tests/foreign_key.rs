mod support;

use support::MemoryBackend;

use strata_core::{Constraint, Field, Model, Query, Record, Value};
use std::sync::Arc;

struct Universe {
    backend: Arc<MemoryBackend>,
    region: Model,
    system: Model,
}

fn universe() -> Universe {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert(
        "mapRegions",
        Record::new().with("id", 10).with("regionName", "The Forge"),
    );
    backend.insert(
        "mapRegions",
        Record::new().with("id", 11).with("regionName", "Domain"),
    );
    backend.insert(
        "mapSolarSystems",
        Record::new()
            .with("id", 1)
            .with("solarSystemName", "Jita")
            .with("regionID", 10),
    );
    backend.insert(
        "mapSolarSystems",
        Record::new()
            .with("id", 3)
            .with("solarSystemName", "Amarr")
            .with("regionID", 11),
    );

    let region = Model::build("Region", backend.clone())
        .source("mapRegions")
        .field("name", Field::named("regionName").nominal())
        .finish()
        .unwrap();
    let system = Model::build("SolarSystem", backend.clone())
        .source("mapSolarSystems")
        .field("name", Field::named("solarSystemName").nominal())
        .field("region", Field::named("regionID").foreign_key(&region).cacheable())
        .finish()
        .unwrap();

    Universe {
        backend,
        region,
        system,
    }
}

#[test]
fn foreign_field_resolves_to_a_shared_instance() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    let forge = u.region.get(10).unwrap();

    let via_fk = jita.get("region").unwrap().to_obj().unwrap();
    assert!(via_fk.ptr_eq(&forge));
    assert_eq!(via_fk.get("name").unwrap(), Value::from("The Forge"));
}

#[test]
fn cacheable_foreign_field_memoizes_the_instance() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    let first = jita.get("region").unwrap().to_obj().unwrap();
    let second = jita.get("region").unwrap().to_obj().unwrap();
    assert!(first.ptr_eq(&second));
}

#[test]
fn filtering_by_instance_encodes_its_id() {
    let u = universe();

    let forge = u.region.get(10).unwrap();
    let matched: Vec<_> = u
        .system
        .filter(Query::new().with("region", forge))
        .unwrap()
        .collect::<strata_core::Result<_>>()
        .unwrap();

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].get("name").unwrap(), Value::from("Jita"));

    let constraints = u.backend.last_constraints().unwrap();
    assert_eq!(
        constraints.get("regionID"),
        Some(&Constraint::Equal(Value::I64(10)))
    );
}

#[test]
fn any_of_instances_becomes_an_or_of_ids() {
    let u = universe();

    let forge = u.region.get(10).unwrap();
    let domain = u.region.get(11).unwrap();
    let matched: Vec<_> = u
        .system
        .filter(Query::new().with("region__any", vec![forge, domain]))
        .unwrap()
        .collect::<strata_core::Result<_>>()
        .unwrap();

    assert_eq!(matched.len(), 2);
    let constraints = u.backend.last_constraints().unwrap();
    assert_eq!(
        constraints.get("regionID"),
        Some(&Constraint::Or(vec![
            Constraint::Equal(Value::I64(10)),
            Constraint::Equal(Value::I64(11)),
        ]))
    );
}

#[test]
fn non_instance_value_resolves_through_nominal_fields() {
    let u = universe();

    let matched: Vec<_> = u
        .system
        .filter(Query::new().with("region", "The Forge"))
        .unwrap()
        .collect::<strata_core::Result<_>>()
        .unwrap();

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].get("name").unwrap(), Value::from("Jita"));

    let constraints = u.backend.last_constraints().unwrap();
    assert_eq!(
        constraints.get("regionID"),
        Some(&Constraint::Or(vec![Constraint::Equal(Value::I64(10))]))
    );
}

#[test]
fn non_instance_value_without_nominal_target_is_a_resolution_error() {
    let backend = Arc::new(MemoryBackend::new());
    // a target model with no nominal field
    let anon = Model::build("Anon", backend.clone())
        .source("anon")
        .field("payload", Field::new())
        .finish()
        .unwrap();
    let referrer = Model::build("Referrer", backend)
        .source("referrers")
        .field("target", Field::named("targetID").foreign_key(&anon))
        .finish()
        .unwrap();

    let err = referrer
        .filter(Query::new().with("target", "by-name"))
        .unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn instance_of_the_wrong_model_is_rejected() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    let err = u
        .system
        .filter(Query::new().with("region", jita))
        .unwrap_err();
    assert!(err.is_query());
}

#[test]
fn id_round_trips_through_the_foreign_key_machinery() {
    let u = universe();

    // decode: raw id -> instance; encode: instance -> raw id
    let jita = u.system.get(1).unwrap();
    let region = jita.get("region").unwrap().to_obj().unwrap();
    assert_eq!(region.id(), Some(&Value::I64(10)));

    u.system
        .filter(Query::new().with("region", region))
        .unwrap()
        .count();
    let constraints = u.backend.last_constraints().unwrap();
    assert_eq!(
        constraints.get("regionID"),
        Some(&Constraint::Equal(Value::I64(10)))
    );
}

#[test]
fn synthetic_id_field_accepts_instances_too() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    // filtering a model by one of its own instances goes through the
    // synthetic self-referencing id field
    let matched: Vec<_> = u
        .system
        .filter(Query::new().with("id", jita.clone()))
        .unwrap()
        .collect::<strata_core::Result<_>>()
        .unwrap();

    assert_eq!(matched.len(), 1);
    assert!(matched[0].ptr_eq(&jita));
}
