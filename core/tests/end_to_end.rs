use fto_core::engine::{AnalysisRequest, CandidatePatent, FtoEngine};
use fto_core::model::{Claim, FtoStatus, PatentRecord, PriorArtReference, RecommendationType};
use fto_core::source::{collect_candidates, InMemoryPatentSource};
use fto_core::EngineConfig;
use time::macros::date;

fn wireless_patent() -> PatentRecord {
    PatentRecord::new(
        "US7654321B2",
        "Wireless Charging for Electric Vehicles",
        "Wireless power transfer system for electric vehicles.",
        vec![
            Claim::independent(
                1,
                "1. A charging system comprising: wireless power transfer; resonant coupling; and a vehicle interface.",
            ),
            Claim::dependent(
                2,
                1,
                "2. The charging system of claim 1, further comprising a ferrite shield.",
            ),
        ],
        date!(2022 - 08 - 10),
    )
    .unwrap()
    .with_issue_date(date!(2023 - 11 - 15))
    .with_assignee("Tech Innovations Inc")
    .with_classifications(["320/108", "307/104"])
}

fn battery_patent() -> PatentRecord {
    PatentRecord::new(
        "US1234567B2",
        "Electric Vehicle Battery Management System",
        "A system for managing battery charging and discharging.",
        vec![Claim::independent(
            1,
            "A battery management system comprising: a cell monitor; a balancing circuit; and a thermal controller.",
        )],
        date!(2023 - 01 - 15),
    )
    .unwrap()
    .with_classifications(["320/132", "320/134"])
}

#[test]
fn wireless_charging_scenario_blocks() {
    let engine = FtoEngine::new(EngineConfig::default()).unwrap();
    let source = InMemoryPatentSource::new(vec![wireless_patent(), battery_patent()]);
    let request = AnalysisRequest {
        technology: "wireless charging".to_string(),
        target: engine.target_from_phrases(&["wireless power transfer", "resonant inductive coupling"]),
        candidates: collect_candidates(&source, "wireless charging").unwrap(),
    };
    let out = engine.analyze(&request);

    let wireless = &out.blocking[0];
    assert_eq!(wireless.patent_id, "US7654321B2");
    assert!(wireless.score >= 0.85);
    assert!(wireless.is_blocking);
    assert_eq!(wireless.dominant_claim, Some(1));
    assert_eq!(wireless.matched_elements.len(), 1);
    assert_eq!(wireless.matched_elements[0].candidate_text, "wireless power transfer");
    assert!(!out.blocking[1].is_blocking);

    assert!(out.invalidity.iter().all(|i| i.score == 0.0));
    assert_eq!(out.verdict.status, FtoStatus::Blocked);
    let kinds: Vec<RecommendationType> = out.verdict.recommendations.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RecommendationType::Licensing, RecommendationType::DesignAround]);
    assert_eq!(out.verdict.recommendations[0].patents, vec!["US7654321B2".to_string()]);
}

#[test]
fn strong_prior_art_downgrades_to_review() {
    let engine = FtoEngine::new(EngineConfig::default()).unwrap();
    let art = PriorArtReference::literature(
        "NPL-2015-017",
        "Resonant charging of parked vehicles",
        date!(2015 - 06 - 01),
        "Prototype. Components: wireless power transfer; resonant coupling; and a vehicle interface.",
    );
    let request = AnalysisRequest {
        technology: "wireless charging".to_string(),
        target: engine.target_from_phrases(&["wireless power transfer"]),
        candidates: vec![CandidatePatent {
            patent: wireless_patent(),
            prior_art: vec![art],
        }],
    };
    let out = engine.analyze(&request);

    assert!(out.invalidity[0].is_strong);
    assert_eq!(out.invalidity[0].score, 1.0);
    assert_eq!(out.verdict.status, FtoStatus::NeedsReview);
    let kinds: Vec<RecommendationType> = out.verdict.recommendations.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RecommendationType::DesignAround, RecommendationType::Reexamination]);
    assert_eq!(out.prior_art_summary.total_prior_art_references, 1);
    assert_eq!(out.prior_art_summary.strong_invalidity_candidates, 1);
}

#[test]
fn art_dates_decide_weight() {
    let engine = FtoEngine::new(EngineConfig::default()).unwrap();
    let text = "Prototype. Components: wireless power transfer; resonant coupling; and a vehicle interface.";
    let run = |published| {
        let request = AnalysisRequest {
            technology: "wireless charging".to_string(),
            target: engine.target_from_phrases(&["wireless power transfer"]),
            candidates: vec![CandidatePatent {
                patent: wireless_patent(),
                prior_art: vec![PriorArtReference::literature("NPL-1", "Pad", published, text)],
            }],
        };
        engine.analyze(&request)
    };

    let before = run(date!(2020 - 01 - 01));
    let after = run(date!(2024 - 01 - 01));
    assert_eq!(before.invalidity[0].score, 1.0);
    assert_eq!(after.invalidity[0].score, 0.0);
    assert_eq!(after.invalidity[0].excluded_by_date, 1);
    assert_eq!(after.verdict.status, FtoStatus::Blocked);
}

#[test]
fn every_score_stays_in_unit_range() {
    let engine = FtoEngine::new(EngineConfig::default()).unwrap();
    let empty = PatentRecord::new("US0", "Empty", "", vec![], date!(2020 - 01 - 01)).unwrap();
    let request = AnalysisRequest {
        technology: "battery".to_string(),
        target: engine.target_from_description("a cell monitor; a balancing circuit"),
        candidates: vec![
            CandidatePatent { patent: battery_patent(), prior_art: vec![] },
            CandidatePatent { patent: wireless_patent(), prior_art: vec![] },
            CandidatePatent { patent: empty, prior_art: vec![] },
        ],
    };
    let out = engine.analyze(&request);
    for b in &out.blocking {
        assert!((0.0..=1.0).contains(&b.score));
        for c in &b.claim_scores {
            assert!((0.0..=1.0).contains(&c.score));
        }
    }
    for i in &out.invalidity {
        assert!((0.0..=1.0).contains(&i.score));
    }
    assert!((0.0..=1.0).contains(&out.verdict.confidence));
    assert_eq!(out.blocking[2].score, 0.0);
}

#[test]
fn json_request_round_trips_through_engine() {
    let raw = r#"{
        "technology": "wireless charging",
        "target": [],
        "candidates": [{
            "patent": {
                "identifier": "US7654321B2",
                "title": "Wireless Charging for Electric Vehicles",
                "abstract": "Wireless power transfer system.",
                "claims": [
                    {"index": 1, "text": "A charging system comprising: wireless power transfer; and a vehicle interface.", "is_independent": true},
                    {"index": 2, "text": "The charging system of claim 1, wherein a coil is used.", "is_independent": false, "depends_on": 1}
                ],
                "filing_date": "2022-08-10",
                "classification_codes": ["320/108"]
            }
        }]
    }"#;
    let engine = FtoEngine::new(EngineConfig::default()).unwrap();
    let mut request: AnalysisRequest = serde_json::from_str(raw).unwrap();
    request.target = engine.target_from_phrases(&["vehicle interface"]);
    let out = engine.analyze(&request);
    assert_eq!(out.verdict.status, FtoStatus::Blocked);

    let v = serde_json::to_value(&out.verdict).unwrap();
    assert_eq!(v["status"], "BLOCKED");
    assert_eq!(v["recommendations"][0]["type"], "licensing");
    assert_eq!(v["recommendations"][0]["priority"], "high");
}
