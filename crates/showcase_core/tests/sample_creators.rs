mod common;

use common::{request, session_seeded, Fixture};
use showcase_core::{
    LabelPath, LabelPathKind, SampleRequest, SamplingConfig, SamplingError, Seed,
};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use uuid::Uuid;

#[test]
fn worked_example_is_stable_and_excludes_private_creator() {
    let mut fixture = Fixture::new();
    let example = fixture.worked_example();

    let mut service = fixture.service();
    let first = service.sample_creators(&request(42, 0, 2)).unwrap();
    let second = service.sample_creators(&request(42, 0, 2)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.seed, Seed::new(42));

    let ids: HashSet<Uuid> = first.items.iter().map(|item| item.parent.id).collect();
    assert_eq!(ids, HashSet::from([example.a, example.b]));
    assert!(!ids.contains(&example.c));

    for item in &first.items {
        assert!(item.parent.is_public);
        assert_eq!(
            item.parent.owner.as_ref().map(|owner| owner.label.as_str()),
            Some("studio")
        );
        let work = item.representative.as_ref().unwrap();
        assert_eq!(work.creator_id, item.parent.id);
        assert!(work.is_public);
        assert_eq!(
            work.image_filename.as_deref(),
            Some(format!("hash-{}.png", work.label).as_str())
        );
        assert_eq!(work.slug(), Some(format!("studio/{}/{}", item.parent.label, work.label)));
    }
}

#[test]
fn same_seed_replays_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("showcase.db");
    {
        let fixture = Fixture::at(&path);
        fixture.many_creators(12);
    }

    let mut first = Fixture::at(&path);
    let mut second = Fixture::at(&path);
    let left = first.service().sample_creators(&request(7, 0, 12)).unwrap();
    let right = second.service().sample_creators(&request(7, 0, 12)).unwrap();
    assert_eq!(left.items, right.items);
}

#[test]
fn different_seeds_produce_different_orders() {
    let mut fixture = Fixture::new();
    fixture.many_creators(24);
    let mut service = fixture.service();

    let orders: Vec<Vec<Uuid>> = (0..5)
        .map(|seed| {
            service
                .sample_creators(&request(seed, 0, 24))
                .unwrap()
                .items
                .into_iter()
                .map(|item| item.parent.id)
                .collect()
        })
        .collect();
    assert!(orders.iter().any(|order| order != &orders[0]));
    for order in &orders {
        assert_eq!(order.len(), 24);
    }
}

#[test]
fn consecutive_windows_cover_all_parents_once() {
    let mut fixture = Fixture::new();
    let created: HashSet<Uuid> = fixture.many_creators(23).into_iter().collect();
    let mut service = fixture.service();

    let mut seen = Vec::new();
    let mut from = 0;
    loop {
        let page = service.sample_creators(&request(99, from, 5)).unwrap();
        if page.items.is_empty() {
            break;
        }
        seen.extend(page.items.iter().map(|item| item.parent.id));
        from = page.window.next().from;
    }

    let unique: HashSet<Uuid> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 23);
    assert_eq!(unique, created);

    let full: Vec<Uuid> = service
        .sample_creators(&request(99, 0, 23))
        .unwrap()
        .items
        .into_iter()
        .map(|item| item.parent.id)
        .collect();
    assert_eq!(seen, full);
}

#[test]
fn creator_without_visible_work_has_no_representative() {
    let mut fixture = Fixture::new();
    let owner = fixture.owner("studio");
    let hidden_only = fixture.creator(owner, "hidden-only", true);
    fixture.work(hidden_only, "draft", false);
    let empty = fixture.creator(owner, "empty", true);

    let page = fixture.service().sample_creators(&request(1, 0, 10)).unwrap();
    assert_eq!(page.items.len(), 2);
    for item in &page.items {
        assert!(item.representative.is_none());
        assert!([hidden_only, empty].contains(&item.parent.id));
    }
}

#[test]
fn private_works_are_never_drawn() {
    let mut fixture = Fixture::new();
    let owner = fixture.owner("studio");
    let creator = fixture.creator(owner, "ana", true);
    let visible = fixture.work(creator, "shown", true);
    for idx in 0..5 {
        fixture.work(creator, &format!("hidden-{idx}"), false);
    }

    let mut service = fixture.service();
    for seed in 0..20 {
        let page = service.sample_creators(&request(seed, 0, 1)).unwrap();
        let work = page.items[0].representative.as_ref().unwrap();
        assert_eq!(work.id, visible);
    }
}

#[test]
fn label_path_filter_selects_one_creator() {
    let mut fixture = Fixture::new();
    let example = fixture.worked_example();
    let other = fixture.owner("gallery");
    fixture.creator(other, "a", true);

    let mut service = fixture.service();
    let filtered = request(3, 0, 10)
        .with_filter(LabelPath::creator("studio", "a").unwrap());
    let page = service.sample_creators(&filtered).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].parent.id, example.a);

    let private = request(3, 0, 10).with_filter(LabelPath::creator("studio", "c").unwrap());
    assert!(service.sample_creators(&private).unwrap().items.is_empty());

    let missing = request(3, 0, 10).with_filter(LabelPath::creator("nobody", "a").unwrap());
    assert!(service.sample_creators(&missing).unwrap().items.is_empty());
}

#[test]
fn window_edges_return_available_rows() {
    let mut fixture = Fixture::new();
    fixture.worked_example();
    let mut service = fixture.service();

    assert_eq!(service.sample_creators(&request(5, 0, 40)).unwrap().items.len(), 2);
    assert!(service.sample_creators(&request(5, 2, 10)).unwrap().items.is_empty());
    assert!(service.sample_creators(&request(5, 500, 10)).unwrap().items.is_empty());
}

#[test]
fn invalid_requests_fail_before_sampling() {
    let mut fixture = Fixture::new();
    fixture.worked_example();
    let mut service = fixture.service();

    let err = service.sample_creators(&request(1, 0, 0)).unwrap_err();
    assert!(matches!(err, SamplingError::InvalidCount(0)));

    let err = SampleRequest::new(2)
        .with_filter_slug(LabelPathKind::Creator, "studio")
        .unwrap_err();
    assert!(matches!(err, SamplingError::InvalidLabelPath(_)));

    let venue_filter = request(1, 0, 2).with_filter(LabelPath::venue("studio", "hall").unwrap());
    let err = service.sample_creators(&venue_filter).unwrap_err();
    assert!(matches!(err, SamplingError::UnsupportedFilter { .. }));
}

#[test]
fn large_counts_are_honored_by_default() {
    let mut fixture = Fixture::new();
    fixture.many_creators(80);
    let page = fixture.service().sample_creators(&request(8, 0, 60)).unwrap();
    assert_eq!(page.window.count.get(), 60);
    assert_eq!(page.items.len(), 60);

    let rest = fixture.service().sample_creators(&request(8, 60, 60)).unwrap();
    assert_eq!(rest.items.len(), 20);
}

#[test]
fn configured_ceiling_clamps_count() {
    let mut fixture = Fixture::new();
    fixture.many_creators(30);
    let config = SamplingConfig {
        max_count: NonZeroU32::new(12),
    };
    let page = fixture
        .service_with(config)
        .sample_creators(&request(8, 0, 200))
        .unwrap();
    assert_eq!(page.window.count.get(), 12);
    assert_eq!(page.items.len(), 12);
}

#[test]
fn first_window_is_a_prefix_of_longer_windows() {
    let mut fixture = Fixture::new();
    fixture.prolific_creators(23, 3);
    let mut service = fixture.service();

    for seed in 0..20 {
        let mut ids = |count: u32| -> Vec<Uuid> {
            service
                .sample_creators(&request(seed, 0, count))
                .unwrap()
                .items
                .into_iter()
                .map(|item| item.parent.id)
                .collect()
        };
        let short = ids(5);
        let long = ids(23);
        assert_eq!(short[..], long[..5], "seed {seed}");
    }
}

#[test]
fn adjacent_windows_never_overlap() {
    let mut fixture = Fixture::new();
    fixture.prolific_creators(23, 3);
    let mut service = fixture.service();

    for seed in 0..20 {
        let first: HashSet<Uuid> = service
            .sample_creators(&request(seed, 0, 5))
            .unwrap()
            .items
            .iter()
            .map(|item| item.parent.id)
            .collect();
        let second: HashSet<Uuid> = service
            .sample_creators(&request(seed, 5, 5))
            .unwrap()
            .items
            .iter()
            .map(|item| item.parent.id)
            .collect();
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        assert!(first.is_disjoint(&second), "seed {seed}");
    }
}

#[test]
fn representatives_are_stable_across_windows() {
    let mut fixture = Fixture::new();
    fixture.prolific_creators(17, 4);
    let mut service = fixture.service();

    for seed in [3, 99, 4_000_000_000] {
        let full: HashMap<Uuid, Option<Uuid>> = service
            .sample_creators(&request(seed, 0, 17))
            .unwrap()
            .items
            .into_iter()
            .map(|item| (item.parent.id, item.representative.map(|work| work.id)))
            .collect();
        assert_eq!(full.len(), 17);

        let mut paged = HashMap::new();
        for from in (0..17).step_by(4) {
            for item in service.sample_creators(&request(seed, from, 4)).unwrap().items {
                let work = item.representative.map(|work| work.id);
                assert!(paged.insert(item.parent.id, work).is_none());
            }
        }
        assert_eq!(paged, full, "seed {seed}");
    }
}

#[test]
fn seed_is_cleared_after_each_call() {
    let mut fixture = Fixture::new();
    fixture.worked_example();
    fixture.service().sample_creators(&request(42, 0, 2)).unwrap();
    assert!(!session_seeded(&fixture.conn));

    let page = fixture
        .service()
        .sample_creators(&SampleRequest::new(2))
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(!session_seeded(&fixture.conn));
}
