use std::time::{SystemTime, UNIX_EPOCH};

use jackpot_sdk::{
    cache::{CacheEnvelope, CacheStore, MemoryCache},
    error::JackpotError,
    leaderboard,
    loader::{JackpotLoader, LoaderOptions},
    render::{Status, Tier},
    session::Session,
    testing::{self, FakeChain, FakeIndex, RecordingRenderer},
    types::{ContractSnapshot, TimeFilter},
};

type TestLoader = JackpotLoader<FakeIndex, FakeChain, MemoryCache, RecordingRenderer>;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64
}

fn session() -> Session {
    Session::new(testing::scenario_deployment())
}

fn loader(index: FakeIndex, chain: FakeChain, cache: MemoryCache) -> TestLoader {
    JackpotLoader::new(index, chain, cache, RecordingRenderer::default())
}

/// Envelope as persisted by an indexer load `age_ms` ago.
fn indexed_envelope(age_ms: u64) -> CacheEnvelope {
    let captured_at_ms = now_ms() - age_ms;
    let data = testing::scenario_index_data(captured_at_ms / 1000 - 600);
    CacheEnvelope {
        contract: testing::SCENARIO_CONTRACT,
        snapshot: data.summary.as_ref().map(ContractSnapshot::from),
        leaderboard: leaderboard::aggregate(&data.deposits, TimeFilter::All, captured_at_ms / 1000),
        deposits: data.deposits,
        captured_at_ms,
    }
}

fn seeded_cache(envelope: CacheEnvelope) -> MemoryCache {
    let cache = MemoryCache::new();
    cache.store(&envelope).unwrap();
    cache
}

/// Tests a load served by the indexing service.
#[tokio::test]
async fn test_index_load_renders_and_caches() {
    let deposited_at = now_ms() / 1000 - 60;
    let loader = loader(
        FakeIndex::new(Ok(Some(testing::scenario_index_data(deposited_at)))),
        FakeChain::live(testing::scenario_direct_read()),
        MemoryCache::new(),
    );

    let tier = loader.load(&session()).await.unwrap();
    assert_eq!(tier, Tier::Index);
    assert_eq!(loader.chain().verify_calls(), 1);
    assert_eq!(loader.chain().read_calls(), 0);

    let snapshots = loader.renderer().snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].total_pool_eth, "1.0");
    assert_eq!(snapshots[0].jackpot_usd, "500.00");
    assert_eq!(snapshots[0].target_usd, "2200000.00");
    assert!(snapshots[0].progress_percent > 0.0227 && snapshots[0].progress_percent < 0.0228);

    let boards = loader.renderer().leaderboards();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].len(), 1);
    assert_eq!(boards[0][0].address_lower(), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    assert_eq!(boards[0][0].amount_display(), "0.5");

    let statuses = loader.renderer().statuses();
    assert!(matches!(statuses[0], Status::Loading));
    assert!(matches!(
        &statuses[1],
        Status::Rendered { tier: Tier::Index, warnings } if warnings.is_empty()
    ));

    let cached = loader.cache().load().unwrap().unwrap();
    assert_eq!(cached.contract, testing::SCENARIO_CONTRACT);
    assert_eq!(cached.deposits.len(), 1);
    assert_eq!(cached.snapshot.unwrap().total_pool_eth, "1.0");
}

/// Tests that a missing contract stops the load before any tier runs.
#[tokio::test]
async fn test_missing_contract_aborts() {
    let loader = loader(
        FakeIndex::new(Ok(Some(testing::scenario_index_data(0)))),
        FakeChain::without_code(testing::SCENARIO_CONTRACT),
        seeded_cache(indexed_envelope(1_000)),
    );

    let err = loader.load(&session()).await.unwrap_err();
    assert!(matches!(err, JackpotError::ContractNotFound(addr) if addr == testing::SCENARIO_CONTRACT));
    assert_eq!(loader.index().calls(), 0);
    assert!(loader.renderer().snapshots().is_empty());
    assert!(matches!(
        loader.renderer().last_status(),
        Some(Status::Failed(JackpotError::ContractNotFound(_)))
    ));
}

/// Tests that nothing but the error is rendered when every tier fails.
#[tokio::test]
async fn test_all_tiers_down() {
    let loader = loader(FakeIndex::unreachable(), FakeChain::down(2), MemoryCache::new());

    let err = loader.load(&session()).await.unwrap_err();
    assert!(matches!(err, JackpotError::EndpointUnavailable(2)));
    assert_eq!(loader.index().calls(), 1);
    assert_eq!(loader.chain().read_calls(), 1);
    assert!(loader.renderer().snapshots().is_empty());
    assert!(loader.renderer().leaderboards().is_empty());
    assert_eq!(
        loader.renderer().last_status().unwrap().message(),
        "Unable to load jackpot: no RPC endpoint available, 2 tried"
    );
    assert!(loader.cache().load().unwrap().is_none());
}

/// Tests a cache render followed by the contract refresh.
#[tokio::test]
async fn test_fresh_cache_then_background_refresh() {
    let loader = loader(
        FakeIndex::new(Ok(None)),
        FakeChain::live(testing::scenario_direct_read()),
        seeded_cache(indexed_envelope(60_000)),
    );

    let tier = loader.load(&session()).await.unwrap();
    assert_eq!(tier, Tier::Cache);
    assert_eq!(loader.chain().verify_calls(), 1);
    assert_eq!(loader.chain().read_calls(), 1);

    let snapshots = loader.renderer().snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].total_pool_eth, "1.0");
    assert_eq!(snapshots[1].total_pool_eth, "2.0");
    assert_eq!(snapshots[1].progress_percent, 50.0);

    let tiers: Vec<_> = loader
        .renderer()
        .statuses()
        .iter()
        .filter_map(|status| match status {
            Status::Rendered { tier, .. } => Some(*tier),
            _ => None,
        })
        .collect();
    assert_eq!(tiers, vec![Tier::Cache, Tier::Direct]);

    // Both renders rank the carried deposit.
    let boards = loader.renderer().leaderboards();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[1][0].address(), testing::SCENARIO_DEPOSITOR);

    let cached = loader.cache().load().unwrap().unwrap();
    assert_eq!(cached.snapshot.unwrap().total_pool_eth, "2.0");
    assert_eq!(cached.deposits.len(), 1);
    assert!(now_ms() - cached.captured_at_ms >= 60_000);
}

/// Tests that a failed refresh after a cache render keeps the cache render.
#[tokio::test]
async fn test_failed_refresh_after_cache_warns() {
    let loader = loader(
        FakeIndex::unreachable(),
        FakeChain::new(Ok(()), Err(JackpotError::EndpointUnavailable(2))),
        seeded_cache(indexed_envelope(60_000)),
    );

    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Cache);
    assert_eq!(loader.renderer().snapshots().len(), 1);

    let statuses = loader.renderer().statuses();
    assert!(!statuses.iter().any(|status| matches!(status, Status::Failed(_))));
    let Some(Status::Rendered { tier, warnings }) = statuses.last() else {
        panic!("expected rendered status");
    };
    assert_eq!(*tier, Tier::Cache);
    assert!(matches!(
        warnings[..],
        [JackpotError::IndexQueryFailed(_), JackpotError::EndpointUnavailable(2)]
    ));
}

#[tokio::test]
async fn test_cache_render_without_refresh() {
    let loader = loader(
        FakeIndex::unreachable(),
        FakeChain::live(testing::scenario_direct_read()),
        seeded_cache(indexed_envelope(60_000)),
    )
    .with_options(LoaderOptions {
        background_refresh: false,
        ..LoaderOptions::default()
    });

    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Cache);
    assert_eq!(loader.chain().read_calls(), 0);
    assert_eq!(loader.renderer().snapshots().len(), 1);
    assert!(matches!(
        loader.renderer().last_status(),
        Some(Status::Rendered { tier: Tier::Cache, warnings }) if warnings.len() == 1
    ));
}

/// Tests that a stale cache is skipped together with its deposits.
#[tokio::test]
async fn test_stale_cache_uses_contract() {
    let loader = loader(
        FakeIndex::unreachable(),
        FakeChain::live(testing::scenario_direct_read()),
        seeded_cache(indexed_envelope(10 * 60_000)),
    );

    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Direct);

    let snapshots = loader.renderer().snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].total_pool_eth, "2.0");
    assert!(loader.renderer().leaderboards().is_empty());

    let Some(Status::Rendered { warnings, .. }) = loader.renderer().last_status() else {
        panic!("expected rendered status");
    };
    assert!(matches!(
        warnings[..],
        [JackpotError::IndexQueryFailed(_), JackpotError::CacheStale]
    ));
}

/// Tests that old deposits never come back as fresh through the cache.
#[tokio::test]
async fn test_stale_deposits_not_revived() {
    let loader = loader(
        FakeIndex::unreachable(),
        FakeChain::live(testing::scenario_direct_read()),
        seeded_cache(indexed_envelope(2 * 3_600_000)),
    );

    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Direct);
    let cached = loader.cache().load().unwrap().unwrap();
    assert!(cached.deposits.is_empty());
    assert!(cached.leaderboard.is_empty());

    // The direct snapshot is now fresh, the old deposits are gone.
    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Cache);
    assert!(loader.renderer().leaderboards().is_empty());
    assert!(loader.cache().load().unwrap().unwrap().deposits.is_empty());
}

/// Tests that partial contract reads still render and warn.
#[tokio::test]
async fn test_partial_contract_read() {
    let mut read = testing::scenario_direct_read();
    read.jackpot_usd = None;
    read.failures = vec![JackpotError::PartialReadFailure("getJackpotUsd: reverted".to_string())];
    let loader = loader(FakeIndex::new(Ok(None)), FakeChain::live(read), MemoryCache::new());

    assert_eq!(loader.load_direct(&session()).await.unwrap(), Tier::Direct);
    assert_eq!(loader.index().calls(), 0);

    let snapshots = loader.renderer().snapshots();
    assert_eq!(snapshots[0].total_pool_eth, "2.0");
    assert_eq!(snapshots[0].jackpot_usd, "0.00");
    assert_eq!(snapshots[0].progress_percent, 0.0);
    assert!(loader.renderer().leaderboards().is_empty());
    assert!(matches!(
        loader.renderer().last_status(),
        Some(Status::Rendered { tier: Tier::Direct, warnings }) if warnings.len() == 1
    ));
}

/// Tests that a cache of another contract is never rendered.
#[tokio::test]
async fn test_cache_of_other_contract_ignored() {
    let mut envelope = indexed_envelope(1_000);
    envelope.contract = alloy::primitives::Address::with_last_byte(1);
    let loader = loader(
        FakeIndex::new(Ok(None)),
        FakeChain::live(testing::scenario_direct_read()),
        seeded_cache(envelope),
    );

    assert_eq!(loader.load(&session()).await.unwrap(), Tier::Direct);
    assert_eq!(loader.renderer().snapshots().len(), 1);
    assert!(loader.renderer().leaderboards().is_empty());
    assert_eq!(
        loader.cache().load().unwrap().unwrap().contract,
        testing::SCENARIO_CONTRACT
    );
}

/// Tests overlapping loads on the same loader.
#[tokio::test]
async fn test_concurrent_loads() {
    let loader = loader(
        FakeIndex::new(Ok(Some(testing::scenario_index_data(now_ms() / 1000)))),
        FakeChain::live(testing::scenario_direct_read()),
        MemoryCache::new(),
    );
    let session = session();

    let (first, second) = futures::join!(loader.load(&session), loader.load(&session));
    assert_eq!(first.unwrap(), Tier::Index);
    assert_eq!(second.unwrap(), Tier::Index);
    assert_eq!(loader.index().calls(), 2);
    assert_eq!(loader.renderer().snapshots().len(), 2);
    assert!(loader.cache().load().unwrap().is_some());
}
