use brickscout::model::{DealRecord, Provenance};
use brickscout::storage::{merge_into_store, DealQuery, DealStore, JsonStore, SortKey, SqliteStore};

fn deal(n: u32, title: &str, price: f64, temperature: i64) -> DealRecord {
    let mut record = DealRecord::new(
        format!("https://www.dealabs.com/bons-plans/deal-{}", n),
        title,
        price,
    );
    record.temperature = temperature;
    record.source = "dealabs".to_string();
    record
}

/// Runs the same merge scenario against any store
fn check_merge_policy(store: &mut dyn DealStore) {
    let listing = vec![deal(1, "LEGO A", 10.0, 5), deal(2, "LEGO B", 20.0, 7)];
    let stats = merge_into_store(store, &listing, Provenance::Listing).unwrap();
    assert_eq!(stats.inserted, 2);

    let again = merge_into_store(store, &listing, Provenance::Listing).unwrap();
    assert!(!again.changed());

    let detail = vec![deal(2, "LEGO B 10305 (fiche complète)", 18.5, 9)];
    let stats = merge_into_store(store, &detail, Provenance::Detail).unwrap();
    assert_eq!(stats.replaced, 1);

    let rescan = vec![deal(2, "LEGO B", 20.0, 30), deal(3, "LEGO C", 5.0, 1)];
    let stats = merge_into_store(store, &rescan, Provenance::Listing).unwrap();
    assert_eq!(stats.refreshed, 1);
    assert_eq!(stats.inserted, 1);

    let stored = store.load_all().unwrap();
    let links: Vec<&str> = stored.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://www.dealabs.com/bons-plans/deal-1",
            "https://www.dealabs.com/bons-plans/deal-2",
            "https://www.dealabs.com/bons-plans/deal-3",
        ]
    );
    assert_eq!(stored[1].title, "LEGO B 10305 (fiche complète)");
    assert_eq!(stored[1].price, 18.5);
    assert_eq!(stored[1].temperature, 30);

    let hottest = store
        .find(&DealQuery::new().sort_by(SortKey::Temperature).limit(1))
        .unwrap();
    assert_eq!(hottest[0].link, "https://www.dealabs.com/bons-plans/deal-2");
}

#[test]
fn test_json_store_merge_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonStore::open(dir.path().join("deals.json")).unwrap();
    check_merge_policy(&mut store);
}

#[test]
fn test_sqlite_store_merge_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteStore::open(&dir.path().join("deals.db")).unwrap();
    check_merge_policy(&mut store);
}

#[test]
fn test_json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deals.json");

    {
        let mut store = JsonStore::open(&path).unwrap();
        merge_into_store(&mut store, &[deal(1, "LEGO A", 10.0, 5)], Provenance::Listing).unwrap();
    }

    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(reopened.load_all().unwrap().len(), 1);
}
