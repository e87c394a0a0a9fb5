//! End-to-end integration tests for vibes
//!
//! These tests drive complete workflows: share link → acquisition →
//! enrichment, submissions feeding the population used for percentiles,
//! and batch classification of files on disk.

mod common;

use common::{BundleBuilder, temp_dir, write_encoded, write_json};
use std::sync::Arc;
use std::time::Duration;
use vibes::{
    acquisition::{Acquirer, BundleOrigin, BundleRequest},
    batch,
    client::ApiClient,
    demo::{DemoSample, demo_bundle},
    enrichment::Enricher,
    output::get_formatter,
    submission::SubmissionService,
};
use vibes_core::Config;
use vibes_core::types::Quirks;
use vibes_percentile::{PercentileEngine, PercentileOrigin};
use vibes_persona::{Classification, PersonaId, Tier};
use vibes_store::{MemoryBundleStore, MemoryPopulationStore};

#[tokio::test]
async fn test_share_link_to_wrapped_view() {
    let bundle = BundleBuilder::new()
        .tokens(8_000_000, 2_000_000, 6_000_000)
        .build();
    let encoded = vibes_codec::encode(&bundle).unwrap();
    let link = format!("https://wrapped.example.com/?d={encoded}");

    let request = BundleRequest::from_share_link(&link);
    let acquired = Acquirer::new().acquire(&request).await;
    assert_eq!(acquired.origin, BundleOrigin::Inline);

    let view = Enricher::offline().enrich_acquired(acquired).await;
    assert_eq!(view.persona.id, PersonaId::TokenTitan);
    assert_eq!(view.percentile_source, PercentileOrigin::Estimate);
    assert_eq!(view.bundle.stats, bundle.stats);
    assert!(view.bundle_id.is_none());
}

#[tokio::test]
async fn test_short_id_round_trip_through_submission_service() {
    let store = Arc::new(MemoryBundleStore::new(100, chrono::Duration::days(365)));
    let service = Arc::new(
        SubmissionService::new(MemoryPopulationStore::new(100)).with_bundle_store(store),
    );

    let bundle = BundleBuilder::new().projects(25).build();
    let id = service.store_bundle(bundle.clone()).await.unwrap();

    let acquirer = Acquirer::new().with_resolver(service.clone());
    let acquired = acquirer.acquire(&BundleRequest::with_id(&id)).await;
    assert_eq!(acquired.origin, BundleOrigin::ShortId { id: id.clone() });
    assert_eq!(acquired.bundle, bundle);

    let view = Enricher::offline().enrich_acquired(acquired).await;
    assert_eq!(view.bundle_id.as_deref(), Some(id.as_str()));
    assert_eq!(view.persona.id, PersonaId::ProjectNomad);
}

#[tokio::test]
async fn test_missing_id_falls_back_to_inline_then_demo() {
    let store = Arc::new(MemoryBundleStore::new(10, chrono::Duration::days(1)));
    let acquirer = Acquirer::new().with_resolver(store);
    let inline = BundleBuilder::new().longest_session(400.0).build();

    let request = BundleRequest::from_share_link(&format!(
        "?id=zzzzzzzz&d={}",
        vibes_codec::encode(&inline).unwrap()
    ));
    let acquired = acquirer.acquire(&request).await;
    assert_eq!(acquired.origin, BundleOrigin::Inline);
    assert_eq!(acquired.bundle, inline);

    let request = BundleRequest::from_share_link("?id=zzzzzzzz&d=corrupt!!");
    let acquired = acquirer.acquire(&request).await;
    assert_eq!(acquired.origin, BundleOrigin::Demo);
    assert_eq!(acquired.bundle, demo_bundle(DemoSample::Default));
}

#[tokio::test]
async fn test_population_percentiles_and_global_stats() {
    let service = Arc::new(SubmissionService::new(MemoryPopulationStore::new(1_000)));
    let enricher = Enricher::new(PercentileEngine::with_source(
        service.clone(),
        Duration::from_secs(1),
    ));

    // Nine light users, then one heavy user
    for sessions in 1..=9 {
        let light = BundleBuilder::new()
            .tokens(1_000 * sessions, 0, 0)
            .sessions(sessions)
            .build();
        let view = enricher.enrich(light, None).await;
        assert_eq!(view.percentile_source, PercentileOrigin::Population);
    }
    let heavy = BundleBuilder::new()
        .tokens(9_000_000, 1_000_000, 8_000_000)
        .sessions(300)
        .build();
    let view = enricher.enrich(heavy, None).await;

    assert_eq!(view.percentile_source, PercentileOrigin::Population);
    assert_eq!(view.persona.id, PersonaId::TokenTitan);
    // Nine of ten entries are below the heavy user
    assert_eq!(view.percentiles.token_usage, 10.0);
    assert_eq!(view.percentiles.total_sessions, 10.0);

    let stats = service.global_stats().await.unwrap();
    assert_eq!(stats.total_wraps, 10);
    assert_eq!(stats.top_persona, PersonaId::CodeRoulette);
    assert_eq!(stats.avg_sessions, 35);
    assert_eq!(
        stats.total_tokens_processed,
        (1..=9).map(|s| 1_000 * s).sum::<u64>() + 10_000_000
    );
}

#[tokio::test]
async fn test_unreachable_server_degrades_to_estimate() {
    let config = Config::default()
        .with_server_url("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_millis(500));
    let client = ApiClient::from_config(&config).unwrap().unwrap();
    let enricher = Enricher::new(PercentileEngine::with_source(
        Arc::new(client),
        config.request_timeout,
    ));

    let view = enricher
        .enrich(demo_bundle(DemoSample::EssayWriter), None)
        .await;
    assert_eq!(view.percentile_source, PercentileOrigin::Estimate);
    assert_eq!(view.persona.id, PersonaId::Architect);
}

#[tokio::test]
async fn test_batch_classification_covers_each_tier() {
    let dir = temp_dir();
    let files = vec![
        write_json(
            dir.path(),
            "demon.json",
            &BundleBuilder::new().hours(&[(2, 30), (14, 10)]).build(),
        ),
        write_encoded(
            dir.path(),
            "impulsive.txt",
            &BundleBuilder::new()
                .quirks(Quirks {
                    interrupt_count: 12,
                    ..Default::default()
                })
                .build(),
        ),
        write_json(
            dir.path(),
            "bash.json",
            &BundleBuilder::new().tool("Bash", 80).tool("Read", 20).build(),
        ),
        write_json(
            dir.path(),
            "wizard.json",
            &BundleBuilder::new()
                .tokens(2_000_000, 500_000, 1_800_000)
                .build(),
        ),
        write_json(
            dir.path(),
            "bird.json",
            &BundleBuilder::new().hours(&[(6, 10), (14, 20)]).build(),
        ),
        write_json(
            dir.path(),
            "curious.json",
            &BundleBuilder::new().trait_keyword("Curious").build(),
        ),
        write_json(dir.path(), "plain.json", &BundleBuilder::new().build()),
        write_json(
            dir.path(),
            "assigned.json",
            &BundleBuilder::new().persona_id("speed-demon").build(),
        ),
    ];

    let results = batch::classify_files(files).await.unwrap();
    let classifications: Vec<Classification> = results
        .into_iter()
        .map(|(_, result)| result.unwrap().classification)
        .collect();

    assert_eq!(
        classifications,
        vec![
            Classification::Matched {
                persona: PersonaId::ThreeAmDemon,
                tier: Tier::Roast
            },
            Classification::Matched {
                persona: PersonaId::SquirrelBrain,
                tier: Tier::Roast
            },
            Classification::Matched {
                persona: PersonaId::BashBerserker,
                tier: Tier::Behavioral
            },
            Classification::Matched {
                persona: PersonaId::CacheWizard,
                tier: Tier::Achievement
            },
            Classification::Matched {
                persona: PersonaId::EarlyBird,
                tier: Tier::Lifestyle
            },
            Classification::Matched {
                persona: PersonaId::Explorer,
                tier: Tier::Traits
            },
            Classification::Default {
                persona: PersonaId::CodeRoulette
            },
            Classification::Preassigned {
                persona: PersonaId::SpeedDemon
            },
        ]
    );
}

#[tokio::test]
async fn test_rank_batch_output() {
    let dir = temp_dir();
    let paths = vec![
        write_json(dir.path(), "small.json", &BundleBuilder::new().tokens(10, 0, 0).build()),
        write_json(
            dir.path(),
            "large.json",
            &BundleBuilder::new().tokens(10_000, 0, 0).build(),
        ),
    ];

    let bundles = batch::load_bundles(paths)
        .await
        .unwrap()
        .into_iter()
        .map(|(path, bundle)| (path, bundle.unwrap()))
        .collect();
    let service = SubmissionService::new(MemoryPopulationStore::new(10));
    let ranked = batch::rank_bundles(&service, bundles).await.unwrap();

    // small: nobody below → 100 → 99; large: one of two below → 50
    assert_eq!(ranked[0].percentiles.token_usage, 99.0);
    assert_eq!(ranked[1].percentiles.token_usage, 50.0);

    let stats = service.global_stats().await.unwrap();
    let output = get_formatter(true).format_rankings(&ranked, &stats);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["stats"]["totalWraps"], 2);
    assert_eq!(value["rankings"].as_array().unwrap().len(), 2);
}
