//! Property tests for listing, search and label lookup on the in-memory store

use std::collections::BTreeSet;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use proptest::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

use therapy_server::db::{LabelQuery, LabelRepository, MemoryStore, StubFilter, StubRepository, UnitOfWork};
use therapy_server::models::{NewLabel, Pagination, Stub, StubData, SupportedLocales, STUBS_PER_PAGE};
use therapy_server::{build_router, AppState, ServerConfig};

/// Stub ids used by generated labels; every case seeds this many stubs.
const SEEDED_STUBS: i64 = 6;

/// Small alphabet so generated terms actually hit, with LIKE wildcards,
/// the escape character and non-ASCII letters mixed in.
const TEXT: &str = "[ab%_\\\\ął ]{0,8}";
const TERM: &str = "[ab%_\\\\ął]{1,3}";

fn arb_stub() -> impl Strategy<Value = (String, String, String, String)> {
    ("[ab%_\\\\ął]{1,6}", TEXT, TEXT, TEXT)
}

fn arb_label() -> impl Strategy<Value = (String, String, Vec<i64>)> {
    (
        "[A-C]{1,3}",
        "[A-Ca-c]{1,5}",
        prop::collection::vec(1..=SEEDED_STUBS, 0..4),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn seed(store: &MemoryStore, stubs: &[(String, String, String, String)]) -> Vec<Stub> {
    let mut created = Vec::new();
    for (name, description, excerpt, background) in stubs {
        let data = StubData::new(name, description, excerpt, background).unwrap();
        created.push(StubRepository::create(store, data).await.unwrap());
    }
    created
}

fn contains_term(stub: &Stub, term: &str) -> bool {
    stub.searchable_fields().iter().any(|field| field.contains(term))
}

proptest! {
    /// Any page holds at most five stubs, in id order, at the right offset
    #[test]
    fn prop_pages_hold_at_most_five(
        stubs in prop::collection::vec(arb_stub(), 0..25),
        page in 1u32..10,
    ) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            let created = seed(&store, &stubs).await;

            let result = store
                .list(&StubFilter::all(), Pagination::new(page, STUBS_PER_PAGE))
                .await
                .unwrap();

            let expected: Vec<i64> = created
                .iter()
                .skip(((page - 1) * STUBS_PER_PAGE) as usize)
                .take(STUBS_PER_PAGE as usize)
                .map(|stub| stub.id)
                .collect();
            let got: Vec<i64> = result.items.iter().map(|stub| stub.id).collect();

            prop_assert!(result.items.len() <= STUBS_PER_PAGE as usize);
            prop_assert_eq!(got, expected);
            prop_assert_eq!(result.total, created.len() as i64);
            Ok(())
        })?;
    }

    /// Every search hit contains the term literally, and no match is missed
    #[test]
    fn prop_search_hits_contain_term(
        stubs in prop::collection::vec(arb_stub(), 0..20),
        term in TERM,
        page in 1u32..5,
    ) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            let created = seed(&store, &stubs).await;

            let result = store
                .list(&StubFilter::search(&term), Pagination::new(page, STUBS_PER_PAGE))
                .await
                .unwrap();

            prop_assert!(result.items.len() <= STUBS_PER_PAGE as usize);
            for stub in &result.items {
                prop_assert!(contains_term(stub, &term), "{:?} lacks {:?}", stub, term);
            }

            let expected = created.iter().filter(|stub| contains_term(stub, &term)).count();
            prop_assert_eq!(result.total, expected as i64);
            Ok(())
        })?;
    }

    /// Label search returns ascending ids, each with exactly its linked stubs
    #[test]
    fn prop_label_search_loads_linked_stubs(
        labels in prop::collection::vec(arb_label(), 0..8),
        prefix in "[A-Ca-c]{0,2}",
    ) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            let names: Vec<String> = (1..=SEEDED_STUBS).map(|i| format!("stub {i}")).collect();
            for name in &names {
                StubRepository::create(&store, StubData::new(name, "", "", "").unwrap())
                    .await
                    .unwrap();
            }

            let mut work = UnitOfWork::new();
            for (short, report, links) in &labels {
                work.add(NewLabel::new(short, report, links.clone()).unwrap());
            }
            work.commit(&store).await.unwrap();

            let found = store
                .find_labels_by_request(&LabelQuery::by_name_prefix(&prefix))
                .await
                .unwrap();

            let ids: Vec<i64> = found.iter().map(|entry| entry.label.id).collect();
            prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "ids not ascending: {:?}", ids);

            let expected = labels
                .iter()
                .filter(|(short, report, _)| short.starts_with(&prefix) || report.starts_with(&prefix))
                .count();
            prop_assert_eq!(found.len(), expected);

            for entry in &found {
                let (short, _, links) = &labels[(entry.label.id - 1) as usize];
                prop_assert_eq!(&entry.label.short_name, short);

                let linked: Vec<i64> = links.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
                let loaded: Vec<i64> = entry.stubs.iter().map(|stub| stub.id).collect();
                prop_assert_eq!(loaded, linked);
            }
            Ok(())
        })?;
    }

    /// The list endpoint never renders more than five stubs, whatever the page
    #[test]
    fn prop_list_endpoint_pages(count in 0usize..15, page in 1u32..6) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            for i in 0..count {
                let data = StubData::new(&format!("stub {i}"), "", "", "").unwrap();
                StubRepository::create(&store, data).await.unwrap();
            }

            let state = AppState::in_memory(store, SupportedLocales::default()).unwrap();
            let app = build_router(state, &ServerConfig::default());
            let uri = format!("/en/therapy/stubs?page={page}");
            let response = app
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            prop_assert_eq!(response.status(), StatusCode::OK);

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: Value = serde_json::from_slice(&body).unwrap();
            let items = json["pagination"]["items"].as_array().unwrap();
            prop_assert!(items.len() <= STUBS_PER_PAGE as usize);
            prop_assert_eq!(json["pagination"]["total"].as_u64(), Some(count as u64));
            Ok(())
        })?;
    }
}
