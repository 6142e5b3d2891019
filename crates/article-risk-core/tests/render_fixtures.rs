use std::{fs, path::PathBuf};

use article_risk_core::{
    render_report, AnalysisResponse, DisplayModel, OutputFormat, RiskLevel, Tier,
};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(name: &str) -> AnalysisResponse {
    let path = fixture_dir().join(name);
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("fixture {} is not a valid response: {err}", name))
}

#[test]
fn clickbait_fixture() {
    let model = DisplayModel::from_response(&load_fixture("clickbait.json"));
    assert_eq!(model.summary.level, RiskLevel::Danger);
    assert_eq!(model.summary.classification.tier, Tier::High);

    let tiers: Vec<_> = model
        .categories
        .iter()
        .map(|block| (block.key.as_str(), block.classification.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("aggro_score", Tier::Critical),
            ("mismatch_score", Tier::High),
            ("crossref_score", Tier::High),
        ]
    );
    assert_eq!(
        model.categories[0].reason,
        "요약문: '충격', '경악' 등 자극적 표현이 반복됨"
    );
    assert_eq!(
        model.categories[1].reason,
        "요약문: 제목의 주장이 본문에서 일부만 뒷받침됨"
    );
    let similarities: Vec<_> = model.categories[2]
        .related
        .iter()
        .map(|related| related.similarity_percent)
        .collect();
    assert_eq!(similarities, vec![82, 62]);

    let human = render_report(&model, OutputFormat::Human, false).unwrap();
    assert!(human.contains("종합 위험도: 위험 (74%)"));
    assert!(human.contains("https://press.example/articles/98 (유사도 62%)"));
}

#[test]
fn calm_fixture() {
    let model = DisplayModel::from_response(&load_fixture("calm.json"));
    assert_eq!(model.summary.level, RiskLevel::Safe);
    assert_eq!(model.summary.classification.tier, Tier::Low);
    assert!(model
        .categories
        .iter()
        .all(|block| block.classification.tier == Tier::Low && block.related.is_empty()));

    let human = render_report(&model, OutputFormat::Human, false).unwrap();
    assert!(!human.contains("관련 기사"));
    assert!(!human.contains("권고:"));
    assert!(human.contains("분석: 요약문: 과장 표현 없음"));
}

#[test]
fn unknown_category_fixture() {
    let model = DisplayModel::from_response(&load_fixture("unknown_category.json"));
    assert_eq!(model.summary.level, RiskLevel::Warning);
    assert_eq!(model.summary.classification.tier, Tier::High);

    let block = &model.categories[0];
    assert_eq!(block.label, "source_score");
    assert_eq!(block.classification.tier, Tier::Low);
    assert_eq!(block.reason, "익명 취재원 의존");
}
