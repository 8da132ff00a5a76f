use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use glidercheck::{
    column::ColumnError,
    core::store::{GliderCardSearch, Store, StoreError},
    model::{DailyWeight, GliderCard, GliderType, Organization, Photo, Pilot},
    types::{EntityKind, Id},
};

struct Fixture {
    org: Id,
    pilot: Id,
    glider_type: Id,
    card: Id,
}

fn organization(name: &str, code: &str) -> Organization {
    Organization {
        name: name.to_string(),
        code: code.to_string(),
        ..Organization::default()
    }
}

fn pilot(firstname: &str, surname: &str) -> Pilot {
    Pilot {
        firstname: firstname.to_string(),
        surname: surname.to_string(),
        ..Pilot::default()
    }
}

fn card(registration: &str, number: &str, glider_type: Id, pilot: Id, org: Id) -> GliderCard {
    GliderCard {
        registration: registration.to_string(),
        competition_number: number.to_string(),
        glider_type_id: glider_type,
        pilot_id: pilot,
        organization_id: org,
        ..GliderCard::default()
    }
}

fn daily(card: Id, day: u32, weight: i32) -> DailyWeight {
    DailyWeight {
        glider_card_id: card,
        date: NaiveDate::from_ymd_opt(2024, 7, day)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap(),
        tow_bar_weight: weight,
        ..DailyWeight::default()
    }
}

fn photo(card: Id, md5_char: char, main: bool) -> Photo {
    Photo {
        glider_card_id: card,
        md5: md5_char.to_string().repeat(32),
        main,
        ..Photo::default()
    }
}

fn populate(store: &mut Store) -> Fixture {
    let org = store.insert(organization("Aeroklub Brno", "BRN")).expect("org");
    let pilot = store.insert(pilot("Jan", "Novak")).expect("pilot");
    let glider_type = store
        .insert(GliderType {
            name: "Std Cirrus".to_string(),
            club_class: true,
            coefficient: Some(Decimal::new(100, 2)),
            ..GliderType::default()
        })
        .expect("type");
    let card = store
        .insert(card("OK-1234", "KA", glider_type, pilot, org))
        .expect("card");
    Fixture {
        org,
        pilot,
        glider_type,
        card,
    }
}

#[test]
fn deleting_referenced_organization_is_blocked() {
    let mut store = Store::new();
    let fx = populate(&mut store);

    let err = store.delete::<Organization>(fx.org).unwrap_err();
    assert_eq!(
        err,
        StoreError::StillReferenced {
            kind: EntityKind::Organization,
            id: fx.org,
            by: EntityKind::GliderCard,
            by_id: fx.card,
        }
    );
    assert!(store.get::<Organization>(fx.org).is_some());
}

#[test]
fn deleting_unreferenced_organization_succeeds() {
    let mut store = Store::new();
    populate(&mut store);
    let spare = store.insert(organization("Aeroklub Praha", "PRG")).expect("org");

    let removed = store.delete::<Organization>(spare).expect("delete");
    assert_eq!(removed.len(), 1);
    assert!(store.get::<Organization>(spare).is_none());
}

#[test]
fn pilot_and_type_deletes_are_blocked_while_a_card_uses_them() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    assert!(matches!(
        store.delete::<Pilot>(fx.pilot),
        Err(StoreError::StillReferenced { .. })
    ));
    assert!(matches!(
        store.delete::<GliderType>(fx.glider_type),
        Err(StoreError::StillReferenced { .. })
    ));
}

#[test]
fn duplicate_daily_weight_for_same_card_and_date_is_rejected() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let first = store.insert(daily(fx.card, 1, 12)).expect("first");

    let err = store.insert(daily(fx.card, 1, 14)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Duplicate { constraint: "uq_daily_weight_date", other, .. } if other == first
    ));
    store.insert(daily(fx.card, 2, 14)).expect("next day");
    assert_eq!(store.count::<DailyWeight>(), 2);
}

#[test]
fn unique_columns_reject_second_row() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let other_pilot = store.insert(pilot("Petr", "Svoboda")).expect("pilot");

    let same_registration = card("OK-1234", "ZZ", fx.glider_type, other_pilot, fx.org);
    assert!(matches!(
        store.insert(same_registration),
        Err(StoreError::Duplicate { constraint: "uq_glider_card_registration", .. })
    ));

    let same_pilot = card("OK-9999", "ZZ", fx.glider_type, fx.pilot, fx.org);
    assert!(matches!(
        store.insert(same_pilot),
        Err(StoreError::Duplicate { constraint: "uq_glider_card_pilot", .. })
    ));

    assert!(matches!(
        store.insert(organization("Other", "BRN")),
        Err(StoreError::Duplicate { constraint: "uq_organization_code", .. })
    ));
    assert!(matches!(
        store.insert(photo(fx.card, 'a', true)).and_then(|_| store.insert(photo(fx.card, 'a', false))),
        Err(StoreError::Duplicate { constraint: "uq_photo_md5", .. })
    ));
}

#[test]
fn pilot_uniqueness_covers_birth_year_and_sex() {
    let mut store = Store::new();
    let senior = Pilot {
        year_of_birth: Some(1960),
        ..pilot("Jan", "Novak")
    };
    let junior = Pilot {
        year_of_birth: Some(1995),
        ..pilot("Jan", "Novak")
    };
    store.insert(senior.clone()).expect("senior");
    store.insert(junior).expect("same name, other year");
    assert!(matches!(
        store.insert(senior),
        Err(StoreError::Duplicate { constraint: "uq_pilot_name", .. })
    ));
}

#[test]
fn empty_degree_is_distinct_from_no_degree() {
    let mut store = Store::new();
    store.insert(pilot("Jan", "Novak")).expect("no degree");
    store
        .insert(Pilot {
            degree: Some(String::new()),
            ..pilot("Jan", "Novak")
        })
        .expect("empty degree");
    assert_eq!(store.count::<Pilot>(), 2);
}

#[test]
fn empty_required_text_is_rejected() {
    let mut store = Store::new();
    assert!(matches!(
        store.insert(organization("", "BRN")),
        Err(StoreError::Invalid {
            kind: EntityKind::Organization,
            source: ColumnError::Required { ref column },
            ..
        }) if column == "name"
    ));
    assert!(matches!(
        store.insert(pilot("Jan", "")),
        Err(StoreError::Invalid { kind: EntityKind::Pilot, .. })
    ));
    assert!(store.is_empty());
    assert!(!store.has_pending());
}

#[test]
fn missing_foreign_key_is_rejected() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let err = store.insert(daily(fx.card + 100, 1, 10)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingReference { target: EntityKind::GliderCard, .. }
    ));
}

#[test]
fn deleting_card_cascades_to_photos_and_daily_weights() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    store.insert(photo(fx.card, 'a', true)).expect("photo");
    store.insert(photo(fx.card, 'b', false)).expect("photo");
    store.insert(daily(fx.card, 1, 12)).expect("daily");

    let removed = store.delete::<GliderCard>(fx.card).expect("delete card");
    assert_eq!(removed.len(), 4);
    assert_eq!(removed.last().map(|r| r.kind()), Some(EntityKind::GliderCard));
    assert_eq!(store.count::<Photo>(), 0);
    assert_eq!(store.count::<DailyWeight>(), 0);

    store.delete::<Pilot>(fx.pilot).expect("pilot no longer referenced");
}

#[test]
fn rollback_restores_state_before_pending_changes() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    store.insert(daily(fx.card, 1, 12)).expect("daily");
    store.mark_committed();
    let before: Vec<_> = EntityKind::ORDERED.iter().map(|k| store.rows(*k)).collect();

    let mut renamed = store.get::<Organization>(fx.org).cloned().expect("org");
    renamed.name = "Renamed".to_string();
    store.update(renamed).expect("update");
    store.delete::<GliderCard>(fx.card).expect("delete");
    store.insert(organization("New", "NEW")).expect("insert");
    assert!(store.has_pending());

    store.rollback();
    let after: Vec<_> = EntityKind::ORDERED.iter().map(|k| store.rows(*k)).collect();
    assert_eq!(before, after);
    assert!(!store.has_pending());

    store
        .insert(organization("Renamed", "REN"))
        .expect("unique index restored too");
}

#[test]
fn set_main_photo_keeps_exactly_one_main() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let first = store.insert(photo(fx.card, 'a', true)).expect("photo");
    let second = store.insert(photo(fx.card, 'b', false)).expect("photo");

    store.set_main_photo(second).expect("set main");
    assert_eq!(store.main_photo(fx.card).map(|p| p.id), Some(second));
    let ordered: Vec<Id> = store.photos_of(fx.card).iter().map(|p| p.id).collect();
    assert_eq!(ordered, vec![second, first]);
}

#[test]
fn daily_weights_are_listed_latest_first() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let early = store.insert(daily(fx.card, 1, 12)).expect("daily");
    let late = store.insert(daily(fx.card, 5, 13)).expect("daily");
    let ids: Vec<Id> = store.daily_weights_of(fx.card).iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![late, early]);
}

#[test]
fn glider_card_search_modes() {
    let mut store = Store::new();
    let fx = populate(&mut store);
    let found = |store: &Store, search: GliderCardSearch| -> Vec<Id> {
        store.search_glider_cards(&search).iter().map(|c| c.id).collect()
    };

    assert_eq!(found(&store, GliderCardSearch::CompetitionNumber("ka".into())), vec![fx.card]);
    assert!(found(&store, GliderCardSearch::CompetitionNumber("k".into())).is_empty());
    assert_eq!(found(&store, GliderCardSearch::Registration("1234".into())), vec![fx.card]);
    assert_eq!(found(&store, GliderCardSearch::GliderTypeName("cirr".into())), vec![fx.card]);
    assert_eq!(found(&store, GliderCardSearch::PilotSurname("nov".into())), vec![fx.card]);
    assert!(found(&store, GliderCardSearch::PilotSurname("vak".into())).is_empty());
}

#[test]
fn rows_sort_by_any_column() {
    let mut store = Store::new();
    store.insert(organization("Beta", "B")).expect("org");
    store.insert(organization("alpha", "A")).expect("org");
    store.insert(organization("Gamma", "G")).expect("org");

    let names: Vec<&str> = store
        .sorted_by::<Organization>("name", false)
        .expect("sort")
        .iter()
        .map(|o| o.name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "Beta", "Gamma"]);
    assert!(store.sorted_by::<Organization>("missing", false).is_err());
}

proptest! {
    #[test]
    fn merging_the_same_rows_twice_is_idempotent(weights in proptest::collection::vec(0i32..40, 1..12)) {
        let mut source = Store::new();
        let fx = populate(&mut source);
        for (day, weight) in weights.iter().enumerate() {
            source.insert(daily(fx.card, day as u32 + 1, *weight)).expect("daily");
        }

        let rows: Vec<_> = EntityKind::ORDERED.iter().flat_map(|k| source.rows(*k)).collect();
        let mut target = Store::new();
        for _ in 0..2 {
            for row in rows.clone() {
                target.merge_row(row).expect("merge");
            }
            for kind in EntityKind::ORDERED {
                prop_assert_eq!(target.rows(kind), source.rows(kind));
            }
        }
    }
}
