//! Warm-up integration tests
//!
//! Startup loads the default synchronously; everything else loads on
//! background workers, and failures there are logged and abandoned.

use crate::helpers::*;
use cantus::prelude::*;
use cantus::{Error, ErrorKind};
use std::time::Duration;

/// Readiness is raised as soon as the default is loaded, with the rest of the
/// catalog still queued.
#[test]
fn test_ready_before_background_loads() {
    init_tracing();
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    for id in [FR_MODEL, DE_MODEL, ES_MODEL] {
        engines.gates.close(id);
    }

    let cantus = fixture.builder(&engines).build().unwrap();

    assert!(cantus.is_ready());
    assert_eq!(cantus.current_model().unwrap(), EN_MODEL);
    assert_eq!(cantus.warmup().pending(), 3);
    assert_eq!(cantus.registry().loaded_ids(), vec![ModelId::new(EN_MODEL)]);
    assert!(cantus.render(&SynthesisRequest::new("hello")).is_ok());

    engines.gates.open_all();
    let report = cantus.warmup().wait();

    assert!(cantus.warmup().is_finished());
    assert!(report.failed.is_empty());
    assert_eq!(
        report.loaded,
        vec![
            ModelId::new(DE_MODEL),
            ModelId::new(ES_MODEL),
            ModelId::new(FR_MODEL),
        ]
    );
    assert_eq!(cantus.registry().len(), 4);
}

/// A failing background model is abandoned; the rest load and serve.
#[test]
fn test_failed_background_load_abandoned() {
    init_tracing();
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.fail(DE_MODEL);

    let cantus = settled_service(&fixture, &engines);
    let report = cantus.warmup().report();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, DE_MODEL);
    assert!(report.failed[0].1.contains("refused to start"));
    assert_eq!(report.loaded.len(), 2);

    let de = ModelId::new(DE_MODEL);
    assert!(matches!(cantus.registry().status(&de), ModelStatus::Failed(_)));

    let err = cantus
        .render(&SynthesisRequest::new("hallo").model(DE_MODEL))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelNotLoaded);

    let out = cantus
        .render(&SynthesisRequest::new("hola").model(ES_MODEL))
        .unwrap();
    assert_eq!(out.model, ES_MODEL);
}

/// Missing artifacts fail the fetch before any engine is built.
#[test]
fn test_missing_artifacts_fail_fetch() {
    let fixture = Fixture::with_missing(&CATALOG, &[FR_MODEL]);
    let engines = TestEngines::new();

    let cantus = settled_service(&fixture, &engines);
    let report = cantus.warmup().report();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, FR_MODEL);
    assert!(report.failed[0].1.contains("Failed to fetch"), "{}", report.failed[0].1);
    assert_eq!(engines.inits(), 3);
}

/// Fetched artifacts land in the cache under a path-safe directory, one
/// subdirectory per artifact role.
#[test]
fn test_artifacts_cached_per_model() {
    let fixture = Fixture::new(&[EN_MODEL, FR_MODEL]);
    let engines = TestEngines::new();
    let _cantus = settled_service(&fixture, &engines);

    for id in [EN_MODEL, FR_MODEL] {
        let dir = fixture
            .path()
            .join("cache")
            .join(ModelId::new(id).cache_dir_name());
        assert_eq!(
            std::fs::read(dir.join("checkpoint").join("model.pth")).unwrap(),
            id.as_bytes()
        );
        assert!(dir.join("config").join("config.json").is_file());
    }
}

/// A second service over the same cache starts cleanly.
#[test]
fn test_restart_over_warm_cache() {
    let fixture = Fixture::new(&[EN_MODEL, FR_MODEL]);
    let engines = TestEngines::new();
    drop(settled_service(&fixture, &engines));

    let cantus = settled_service(&fixture, &engines);
    assert!(cantus.warmup().report().failed.is_empty());
    assert_eq!(cantus.registry().len(), 2);
    assert_eq!(engines.inits(), 4);
}

/// A default model that cannot be loaded is fatal.
#[test]
fn test_default_failure_is_fatal() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.fail(EN_MODEL);

    let err = fixture.builder(&engines).build().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InitFailed);
    assert!(matches!(err, Error::Warmup(_)));
    // Nothing else was attempted.
    assert_eq!(engines.inits(), 1);
}

#[test]
fn test_default_missing_artifacts_is_fatal() {
    let fixture = Fixture::with_missing(&CATALOG, &[EN_MODEL]);
    let engines = TestEngines::new();

    let err = fixture.builder(&engines).build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FetchFailed);
    assert_eq!(engines.inits(), 0);
}

#[test]
fn test_unknown_default_is_fatal() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();

    let err = fixture
        .builder(&engines)
        .default_model("tts/xx/nowhere/none")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownModel);
}

/// With fallback enabled the first other catalog entry becomes the default,
/// and the failed default is not retried in the background.
#[test]
fn test_fallback_to_first_available() {
    init_tracing();
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.fail(EN_MODEL);

    let cantus = fixture
        .builder(&engines)
        .fallback_to_first_available(true)
        .build()
        .unwrap();

    assert!(cantus.is_ready());
    assert_eq!(cantus.current_model().unwrap(), FR_MODEL);
    let out = cantus.render(&SynthesisRequest::new("salut")).unwrap();
    assert_eq!(out.sample_rate, 24000);

    let report = cantus.warmup().wait();
    assert_eq!(
        report.loaded,
        vec![ModelId::new(DE_MODEL), ModelId::new(ES_MODEL)]
    );
    let en = ModelId::new(EN_MODEL);
    assert!(matches!(cantus.registry().status(&en), ModelStatus::Failed(_)));
    assert_eq!(engines.inits(), 4);
}

/// Fallback that also fails still reports the configured default.
#[test]
fn test_fallback_failure_is_fatal() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.fail(EN_MODEL);
    engines.fail(FR_MODEL);

    let err = fixture
        .builder(&engines)
        .fallback_to_first_available(true)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InitFailed);
    assert!(err.to_string().contains(EN_MODEL));
}

/// A pool of one never runs two loads at once.
#[test]
fn test_bounded_pool() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();

    let cantus = fixture
        .builder(&engines)
        .max_concurrent_loads(1)
        .build()
        .unwrap();
    let report = cantus.warmup().wait();

    assert_eq!(report.loaded.len(), 3);
    assert_eq!(engines.peak_in_flight(), 1);
}

/// Without a bound every background model loads concurrently.
#[test]
fn test_unbounded_pool_overlaps() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    for id in [FR_MODEL, DE_MODEL, ES_MODEL] {
        engines.gates.close(id);
    }

    let cantus = fixture.builder(&engines).build().unwrap();
    let overlapped = wait_until(|| engines.peak_in_flight() == 3);
    engines.gates.open_all();

    assert!(overlapped, "peak was {}", engines.peak_in_flight());
    assert_eq!(cantus.warmup().wait().loaded.len(), 3);
}

/// Loads exceeding the timeout are abandoned like any other failure. Sub-second
/// timeouts are honored as given.
#[test]
fn test_load_timeout() {
    init_tracing();
    let fixture = Fixture::new(&[EN_MODEL, DE_MODEL]);
    let engines = TestEngines::new();
    engines.gates.close(DE_MODEL);

    let cantus = fixture
        .builder(&engines)
        .load_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let started = std::time::Instant::now();
    let report = cantus.warmup().wait();
    let waited = started.elapsed();
    engines.gates.open_all();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("timed out"), "{}", report.failed[0].1);
    assert!(report.failed[0].1.contains("200ms"), "{}", report.failed[0].1);
    assert!(waited < Duration::from_millis(900), "waited {:?}", waited);
    let de = ModelId::new(DE_MODEL);
    assert!(matches!(cantus.registry().status(&de), ModelStatus::Failed(_)));
}
