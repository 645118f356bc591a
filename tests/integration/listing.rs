//! Catalog listing integration tests

use crate::helpers::*;
use cantus::prelude::*;

/// Every catalog entry is listed, loaded or not, with its live status.
#[test]
fn test_listing_during_warmup() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.gates.close(FR_MODEL);
    let cantus = fixture.builder(&engines).build().unwrap();

    let listing = cantus.models();
    assert_eq!(listing.total_models, 4);
    assert_eq!(listing.current_model.as_ref().unwrap(), &ModelId::new(EN_MODEL));

    let ids: Vec<&str> = listing.models.iter().map(|m| m.model_id.as_str()).collect();
    assert_eq!(ids, CATALOG.to_vec());

    let en = &listing.models[0];
    assert_eq!(en.status, ModelStatus::Ready);
    let fr = &listing.models[1];
    assert!(matches!(fr.status, ModelStatus::Queued | ModelStatus::Loading));

    engines.gates.open_all();
    cantus.warmup().wait();
    assert!(cantus.models().models.iter().all(|m| m.status.is_ready()));
}

#[test]
fn test_listing_grouped_by_language() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    let cantus = settled_service(&fixture, &engines);

    let listing = cantus.models();
    let languages: Vec<&str> = listing.languages.iter().map(String::as_str).collect();
    assert_eq!(languages, vec!["de", "en", "es", "fr"]);

    let fr = &listing.models_by_language["fr"];
    assert_eq!(fr.len(), 1);
    assert_eq!(fr[0].task_type, "tts");
    assert_eq!(fr[0].dataset, "css10");
    assert_eq!(fr[0].architecture, "vits");
}

/// The listing follows the default after an explicit switch.
#[test]
fn test_listing_reports_current_model() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    let cantus = settled_service(&fixture, &engines);

    cantus
        .render(&SynthesisRequest::new("hola").model(ES_MODEL))
        .unwrap();
    assert_eq!(cantus.models().current_model.unwrap(), ES_MODEL);
}

#[test]
fn test_listing_json_shape() {
    let fixture = Fixture::new(&CATALOG);
    let engines = TestEngines::new();
    engines.fail(DE_MODEL);
    let cantus = settled_service(&fixture, &engines);

    let json = serde_json::to_value(cantus.models()).unwrap();

    assert_eq!(json["total_models"], 4);
    assert_eq!(json["current_model"], EN_MODEL);
    assert_eq!(json["models"][0]["type"], "tts");
    assert_eq!(json["models"][0]["status"]["state"], "ready");
    assert_eq!(json["models"][2]["status"]["state"], "failed");
    assert!(json["models"][2]["status"]["reason"]
        .as_str()
        .unwrap()
        .contains("refused to start"));
    assert_eq!(json["models_by_language"]["de"][0]["language"], "de");
}
