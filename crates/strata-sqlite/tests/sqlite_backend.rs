use rusqlite::Connection;
use strata_core::{Field, Model, Obj, Query, Value};
use strata_sqlite::SqliteBackend;

use std::sync::Arc;

struct Universe {
    region: Model,
    system: Model,
}

fn seeded_backend() -> Arc<SqliteBackend> {
    let connection = Connection::open_in_memory().unwrap();
    connection
        .execute_batch(
            "create table mapRegions (regionName text);
             create table mapSolarSystems (
                 solarSystemName text,
                 security real,
                 regionID integer
             );
             insert into mapRegions (rowid, regionName)
                 values (10, 'The Forge'), (11, 'Domain');
             insert into mapSolarSystems (rowid, solarSystemName, security, regionID)
                 values (1, 'Jita', 0.9, 10),
                        (2, 'Perimeter', 1.0, 10),
                        (3, 'Amarr', 1.0, 11);",
        )
        .unwrap();
    Arc::new(SqliteBackend::from_connection(connection))
}

fn universe() -> Universe {
    let backend = seeded_backend();
    let region = Model::build("Region", backend.clone())
        .source("mapRegions")
        .field("name", Field::named("regionName").nominal())
        .finish()
        .unwrap();
    let system = Model::build("SolarSystem", backend)
        .source("mapSolarSystems")
        .field("name", Field::named("solarSystemName").nominal())
        .field("security", Field::new())
        .field("region", Field::named("regionID").foreign_key(&region))
        .finish()
        .unwrap();
    Universe { region, system }
}

fn names(objs: Vec<Obj>) -> Vec<String> {
    objs.iter()
        .map(|obj| obj.get("name").unwrap().to_string().unwrap())
        .collect()
}

fn collect(objs: strata_core::model::Objects) -> Vec<Obj> {
    objs.collect::<strata_core::Result<_>>().unwrap()
}

#[test]
fn fetch_by_rowid_shares_one_instance() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    assert_eq!(jita.get("name").unwrap(), Value::from("Jita"));

    let again = u.system.get(1).unwrap();
    assert!(again.ptr_eq(&jita));
}

#[test]
fn missing_rowid_is_not_found() {
    let u = universe();
    let err = u.system.get(999).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn like_filters_lower_to_sql() {
    let u = universe();
    let matched = collect(
        u.system
            .filter(Query::new().with("name__like", "Jita%"))
            .unwrap(),
    );
    assert_eq!(names(matched), ["Jita"]);
}

#[test]
fn derived_column_names_filter_and_compare() {
    let u = universe();
    let matched = collect(
        u.system
            .filter(Query::new().with("security__ge", 1.0))
            .unwrap(),
    );
    assert_eq!(names(matched), ["Perimeter", "Amarr"]);
}

#[test]
fn unconstrained_fetch_returns_every_row() {
    let u = universe();
    assert_eq!(u.region.all().unwrap().count(), 2);
    assert_eq!(u.system.all().unwrap().count(), 3);
}

#[test]
fn foreign_keys_resolve_against_the_same_database() {
    let u = universe();

    let jita = u.system.get(1).unwrap();
    let forge = jita.get("region").unwrap().to_obj().unwrap();
    assert_eq!(forge.get("name").unwrap(), Value::from("The Forge"));
    assert!(forge.ptr_eq(&u.region.get(10).unwrap()));
}

#[test]
fn filtering_by_region_name_resolves_nominally() {
    let u = universe();
    let matched = collect(
        u.system
            .filter(Query::new().with("region", "The Forge"))
            .unwrap(),
    );
    assert_eq!(names(matched), ["Jita", "Perimeter"]);
}

#[test]
fn filtering_by_any_of_two_regions() {
    let u = universe();
    let forge = u.region.get(10).unwrap();
    let domain = u.region.get(11).unwrap();
    let matched = collect(
        u.system
            .filter(Query::new().with("region__any", vec![forge, domain]))
            .unwrap(),
    );
    assert_eq!(matched.len(), 3);
}

#[test]
fn synthetic_id_field_round_trips_the_rowid() {
    let u = universe();
    let jita = u.system.get(1).unwrap();
    let via_field = jita.get("id").unwrap().to_obj().unwrap();
    assert!(via_field.ptr_eq(&jita));
}

#[test]
fn unknown_columns_fail_schema_verification() {
    let backend = seeded_backend();
    let err = Model::build("SolarSystem", backend)
        .source("mapSolarSystems")
        .field("name", Field::named("noSuchColumn"))
        .finish()
        .unwrap_err();
    assert!(err.is_schema());
    assert!(err.to_string().contains("noSuchColumn"));
}

#[test]
fn missing_tables_fail_schema_verification() {
    let backend = seeded_backend();
    let err = Model::build("Ghost", backend)
        .source("noSuchTable")
        .field("name", Field::new())
        .finish()
        .unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn opening_a_missing_file_is_an_availability_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SqliteBackend::open(dir.path().join("missing.db")).unwrap_err();
    assert!(err.is_unavailable());
}

#[test]
fn connection_urls_follow_the_sqlite_scheme() {
    assert!(SqliteBackend::new("sqlite::memory:").is_ok());
    assert!(SqliteBackend::new("postgres://nope").unwrap_err().is_unavailable());
    assert!(SqliteBackend::new("not a url").unwrap_err().is_unavailable());
}
