use super::*;
use crate::policy::ClauseSpec;
use crate::tequila::{AttributeSet, TequilaConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn record(client_id: &str, requires: &[&str]) -> ClientRecord {
    ClientRecord {
        client_id: client_id.to_string(),
        redirect_uris: vec![
            format!("https://{client_id}.example.com/callback"),
            "https://shared.example.com/*".to_string(),
        ],
        extra_id_token_claims: vec!["email".to_string(), "group".to_string()],
        tequila_requires: requires
            .iter()
            .map(|formula| ClauseSpec::Formula((*formula).to_string()))
            .collect(),
        ..ClientRecord::default()
    }
}

fn clients(records: &[ClientRecord]) -> HashMap<String, ClientRecord> {
    records
        .iter()
        .map(|record| (record.client_id.clone(), record.clone()))
        .collect()
}

fn mock_backend(records: Vec<ClientRecord>, fetches: usize) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_name().return_const("mock");
    backend
        .expect_fetch_all()
        .times(fetches)
        .returning(move || Ok(clients(&records)));
    backend
}

fn registry(backend: impl Backend + 'static) -> ClientRegistry {
    ClientRegistry::new(Box::new(backend), ClientRegistry::DEFAULT_FRESHNESS)
}

/// Replays a fixed list of fetch results and counts the calls.
struct ScriptedBackend {
    results: Mutex<VecDeque<Result<HashMap<String, ClientRecord>, Error>>>,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_all(&self) -> Result<HashMap<String, ClientRecord>, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::BackendUnavailable("script exhausted".to_string())))
    }
}

fn user(groups: &str) -> AttributeSet {
    let mut attributes = AttributeSet::new();
    attributes.insert("name", vec!["Jane".to_string()]);
    attributes.insert("email", vec!["jane@example.com".to_string()]);
    if !groups.is_empty() {
        attributes.insert("group", groups.split(',').map(str::to_string).collect());
    }
    attributes
}

#[tokio::test(start_paused = true)]
async fn test_reads_within_window_fetch_once() {
    let registry = registry(mock_backend(vec![record("app", &[])], 1));

    assert!(registry.contains("app").await.unwrap());
    tokio::time::advance(Duration::from_millis(1500)).await;
    assert_eq!(registry.get("app").await.unwrap().client_id, "app");
    assert!(!registry.contains("other").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_reads_after_window_fetch_again() {
    let registry = registry(mock_backend(vec![record("app", &[])], 2));

    assert!(registry.contains("app").await.unwrap());
    tokio::time::advance(Duration::from_millis(2001)).await;
    assert!(registry.contains("app").await.unwrap());
    assert!(registry.contains("app").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_backend_error_propagates_and_recovers() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let backend = ScriptedBackend {
        results: Mutex::new(VecDeque::from([
            Ok(clients(&[record("app", &[])])),
            Err(Error::BackendUnavailable("file is being rewritten".to_string())),
            Ok(clients(&[record("app", &[]), record("new-app", &[])])),
        ])),
        fetches: fetches.clone(),
    };
    let registry = registry(backend);

    assert!(registry.contains("app").await.unwrap());

    tokio::time::advance(Duration::from_secs(3)).await;
    assert!(matches!(
        registry.get("app").await,
        Err(Error::BackendUnavailable(_))
    ));

    let previous = registry.snapshot.load_full().unwrap();
    assert_eq!(previous.clients.len(), 1);

    assert!(registry.contains("new-app").await.unwrap());
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_refresh_replaces_snapshot_wholesale() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let backend = ScriptedBackend {
        results: Mutex::new(VecDeque::from([
            Ok(clients(&[record("a", &[]), record("b", &[])])),
            Ok(clients(&[record("c", &[])])),
        ])),
        fetches: fetches.clone(),
    };
    let registry = registry(backend);

    let first = registry.snapshot().await.unwrap();
    let second = registry.refresh().await.unwrap();

    assert_eq!(first.clients.len(), 2);
    assert_eq!(second.clients.len(), 1);
    assert!(second.clients.contains_key("c"));
    assert!(!registry.contains("a").await.unwrap());
}

#[tokio::test]
async fn test_get_unknown_client() {
    let registry = registry(mock_backend(vec![], 1));

    let err = registry.get("ghost").await.unwrap_err();
    assert!(matches!(err, Error::UnknownClient(ref id) if id == "ghost"));
    assert!(err.is_access_denied());
}

#[tokio::test]
async fn test_authorize() {
    let registry = registry(mock_backend(
        vec![
            record("open", &[]),
            record("admins-only", &["group=admins"]),
            record("broken", &["role=admins"]),
        ],
        1,
    ));

    assert!(registry
        .authorize("open", &PolicyContext::default())
        .await
        .is_ok());
    assert!(registry
        .authorize("admins-only", &PolicyContext::with_groups(["admins"]))
        .await
        .is_ok());

    let denied = registry
        .authorize("admins-only", &PolicyContext::with_groups(["users"]))
        .await
        .unwrap_err();
    assert!(matches!(denied, Error::PolicyNotSatisfied(_)));
    assert!(denied.is_access_denied());

    let broken = registry
        .authorize("broken", &PolicyContext::with_groups(["admins"]))
        .await
        .unwrap_err();
    assert!(matches!(broken, Error::Policy(_)));
    assert!(!broken.is_access_denied());
}

#[tokio::test]
async fn test_redirect_uri_through_registry() {
    let registry = registry(mock_backend(vec![record("app", &[])], 1));

    assert!(registry
        .is_redirect_uri_allowed("app", "https://app.example.com/callback")
        .await
        .unwrap());
    assert!(registry
        .is_redirect_uri_allowed("app", "https://shared.example.com/any?x=1")
        .await
        .unwrap());
    assert!(!registry
        .is_redirect_uri_allowed("app", "https://app.example.com/other")
        .await
        .unwrap());
    assert!(matches!(
        registry
            .is_redirect_uri_allowed("ghost", "https://app.example.com/callback")
            .await,
        Err(Error::UnknownClient(_))
    ));
}

#[tokio::test]
async fn test_require_check() {
    let registry = registry(mock_backend(
        vec![
            record("open", &[]),
            record("staff", &["group=staff|group=faculty", "group=ic"]),
        ],
        1,
    ));
    let check = RequireCheck::new(&TequilaConfig::default());

    assert!(check
        .check(&registry, "tequila", "open", &user(""))
        .await
        .is_ok());
    assert!(check
        .check(&registry, "tequila", "staff", &user("faculty,ic"))
        .await
        .is_ok());
    assert!(matches!(
        check
            .check(&registry, "tequila", "staff", &user("staff"))
            .await,
        Err(Error::PolicyNotSatisfied(_))
    ));
    assert!(matches!(
        check.check(&registry, "tequila", "staff", &user("")).await,
        Err(Error::MissingGroups(_))
    ));
    assert!(matches!(
        check.check(&registry, "tequila", "ghost", &user("ic")).await,
        Err(Error::UnknownClient(_))
    ));
}

#[tokio::test]
async fn test_require_check_ignores_other_backends() {
    let registry = registry(mock_backend(vec![], 0));
    let check = RequireCheck::new(&TequilaConfig::default());

    assert!(check
        .check(&registry, "saml", "ghost", &user(""))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_require_check_custom_groups_attribute() {
    let registry = registry(mock_backend(vec![record("app", &["group=ic"])], 1));
    let check = RequireCheck::new(&TequilaConfig {
        groups_attribute: "epflGroups".to_string(),
        ..TequilaConfig::default()
    });

    let mut attributes = user("");
    attributes.insert("epflGroups", vec!["ic".to_string()]);

    assert!(check
        .check(&registry, "tequila", "app", &attributes)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_extra_id_token_claims() {
    let registry = registry(mock_backend(vec![record("app", &[])], 1));
    let claims = user("a,b");

    let extra = registry
        .extra_id_token_claims("app", AttributeSet::new(), &claims)
        .await
        .unwrap();
    assert_eq!(extra.len(), 2);
    assert_eq!(
        extra.get("group"),
        Some(&["a".to_string(), "b".to_string()][..])
    );
    assert!(!extra.contains("name"));

    let unknown = registry
        .extra_id_token_claims("ghost", AttributeSet::new(), &claims)
        .await
        .unwrap();
    assert!(unknown.is_empty());

    let mut base = AttributeSet::new();
    base.insert("nickname", vec!["jd".to_string()]);
    let kept = registry
        .extra_id_token_claims("app", base.clone(), &claims)
        .await
        .unwrap();
    assert_eq!(kept, base);
}

/// Serves two disjoint registries in turn, yielding mid-fetch so refreshes interleave.
struct AlternatingBackend {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl Backend for AlternatingBackend {
    fn name(&self) -> &'static str {
        "alternating"
    }

    async fn fetch_all(&self) -> Result<HashMap<String, ClientRecord>, Error> {
        let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if fetch % 2 == 0 {
            Ok(clients(&[record("a-1", &[]), record("a-2", &[])]))
        } else {
            Ok(clients(&[record("b-1", &[]), record("b-2", &[]), record("b-3", &[])]))
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_see_whole_snapshots() {
    const READERS: usize = 16;

    let fetches = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(registry(AlternatingBackend {
        fetches: fetches.clone(),
    }));

    let readers = (0..READERS)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let snapshot = registry.snapshot().await.unwrap();
                let mut client_ids = snapshot.clients.keys().cloned().collect::<Vec<_>>();
                client_ids.sort();
                client_ids
            })
        })
        .collect::<Vec<_>>();

    for reader in readers {
        let client_ids = reader.await.unwrap();
        assert!(
            client_ids == ["a-1", "a-2"] || client_ids == ["b-1", "b-2", "b-3"],
            "Torn snapshot: {client_ids:?}"
        );
    }

    let fetches = fetches.load(Ordering::SeqCst);
    assert!((1..=READERS).contains(&fetches), "{fetches} fetches");

    let current = registry.snapshot().await.unwrap();
    assert!(current.clients.len() == 2 || current.clients.len() == 3);
}
