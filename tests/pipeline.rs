use weather_ocr_correct::grammar::{insert_decimal, mark_sentinels, split_groups};
use weather_ocr_correct::normalize::normalize;
use weather_ocr_correct::{
    Classifier, Corrector, DigitSignature, EngineConfig, FALLBACK_LABEL, LabelSplitter,
    ReprocessAdvisor, VariableType,
};

fn readings(token: &str, count: usize) -> String {
    vec![token; count].join(" ")
}

#[test]
fn test_month_label_and_body() {
    let corrector = Corrector::default();
    let correction = corrector.correct("Jan. 0091523481").unwrap();
    assert_eq!(correction.record.label, "Jan");
    assert_eq!(correction.record.body, "0091523481");
    assert_eq!(correction.line(), "Jan 0091523481");
}

#[test]
fn test_pressure_row() {
    let corrector = Corrector::default();
    let span = format!("Jan. {}", readings("0991", 24));
    let correction = corrector.correct(&span).unwrap();

    assert_eq!(correction.variable, VariableType::Pressure);
    assert_eq!(correction.signature.leading_token, "0");
    assert_eq!(correction.signature.digit_count, 96);
    assert_eq!(correction.line(), format!("Jan {}", readings("[0]99.1", 24)));
}

#[test]
fn test_temperature_row_keeps_points() {
    let corrector = Corrector::default();
    let span = format!("Mean {} 102.3", readings("78.5", 22));
    let correction = corrector.correct(&span).unwrap();

    assert_eq!(correction.variable, VariableType::Temperature);
    assert_eq!(
        correction.record.body,
        format!("{} 102.3", readings("78.5", 22))
    );
}

#[test]
fn test_temperature_row_glued_by_tidy() {
    let corrector = Corrector::default();
    let span = format!("Mean {}", readings("723", 21));
    let correction = corrector.correct(&span).unwrap();

    // The tidy glues 3-digit readings in pairs and nothing splits them again.
    assert_eq!(correction.variable, VariableType::Temperature);
    assert_eq!(
        correction.record.body,
        format!("72.3 {}", readings("723723", 10))
    );
}

#[test]
fn test_humidity_row() {
    let corrector = Corrector::default();
    let span = format!("Mean {}", readings("72", 24));
    let correction = corrector.correct(&span).unwrap();

    assert_eq!(correction.variable, VariableType::RelativeHumidity);
    assert_eq!(correction.record.body, readings("72", 24));
}

#[test]
fn test_diurnal_row() {
    let corrector = Corrector::default();
    let correction = corrector.correct("Dec\n+012 -005 +023").unwrap();

    assert_eq!(correction.record.label, "Dec");
    assert_eq!(correction.variable, VariableType::DiurnalInequality);
    assert!(correction.record.body.ends_with("-0.05 +0.23"));
}

#[test]
fn test_isolated_dashes_become_nan() {
    let corrector = Corrector::default();
    let correction = corrector.correct("Mean 0991 --- 0992").unwrap();
    assert_eq!(correction.line(), "Mean 0991 NaN 0992");
}

#[test]
fn test_leading_four_is_a_plus_sign() {
    let body = normalize("4512 0991", VariableType::Pressure);
    assert!(body.starts_with("+512"));
}

#[test]
fn test_reprocess_digit_led_with_degree_sign() {
    let config = EngineConfig::default();
    let advisor = ReprocessAdvisor::new(&config.reprocess).unwrap();
    let advice = advisor.should_reprocess("3  994 0°\n1001");
    assert_eq!(
        advice.as_tuple(),
        (
            true,
            Some(config.reprocess.legacy_oem),
            Some(config.reprocess.permissive_psm)
        )
    );
}

#[test]
fn test_pressure_classification() {
    let signature = DigitSignature {
        leading_token: "0".to_string(),
        digit_count: 95,
    };
    assert_eq!(Classifier::default().classify(&signature), VariableType::Pressure);
}

#[test]
fn test_fallback_label_keeps_span() {
    let splitter = LabelSplitter::default();
    for span in ["0991 0992", "", "   ", "?? 0991\n\n0992"] {
        let (label, body) = splitter.split(span);
        assert_eq!(label, FALLBACK_LABEL);
        assert_eq!(body, span);
    }
}

#[test]
fn test_unclassifiable_span_still_produces_output() {
    let corrector = Corrector::default();
    let correction = corrector.correct("?? 12").unwrap();
    assert_eq!(correction.record.label, FALLBACK_LABEL);
    assert_eq!(correction.variable, VariableType::Default);
    assert!(correction.line().starts_with("[D] "));
}

#[test]
fn test_correction_is_deterministic() {
    let corrector = Corrector::default();
    let spans = [
        format!("Jan. {}", readings("0991", 24)),
        "Mean 0991 --- 0992".to_string(),
        "4512 ~~ {-12 lO.S -(- 0991\n--- 41.23".to_string(),
        "Dec\n+012 -005 +023".to_string(),
    ];
    for span in &spans {
        assert_eq!(
            corrector.correct(span).unwrap(),
            corrector.correct(span).unwrap()
        );
    }
}

#[test]
fn test_nan_survives_formatting() {
    let cases = [
        (VariableType::Pressure, "0991 NaN 0992"),
        (VariableType::Temperature, "723 NaN 723"),
        (VariableType::RelativeHumidity, "72 NaN 72"),
    ];
    for (variable, body) in cases {
        let split = split_groups(body, variable).unwrap();
        assert!(split.contains(" NaN "), "{variable}: {split}");
        let marked = mark_sentinels(&split);
        assert!(marked.contains(" NaN "), "{variable}: {marked}");
    }
    let pointed = insert_decimal("0991 NaN 0992", VariableType::Pressure).unwrap();
    assert_eq!(mark_sentinels(&pointed), "[0]99.1 NaN [0]99.2");
}

#[test]
fn test_batch_matches_sequential_order() {
    let corrector = Corrector::default();
    let spans: Vec<String> = vec![
        format!("Jan. {}", readings("0991", 24)),
        format!("Mean {}", readings("723", 21)),
        String::new(),
        "Mean 0991 --- 0992".to_string(),
    ];
    let batch = corrector.correct_batch(&spans).unwrap();
    assert_eq!(batch.len(), spans.len());
    for (span, correction) in spans.iter().zip(&batch) {
        assert_eq!(&corrector.correct(span).unwrap(), correction);
    }
}

#[test]
fn test_corrector_uses_configured_rules() {
    let config = EngineConfig::default();
    let corrector = Corrector::new(&config).unwrap();
    assert_eq!(corrector.classifier().rules(), config.rules.as_slice());

    let advisor = ReprocessAdvisor::new(&config.reprocess).unwrap();
    assert_eq!(advisor.config(), &config.reprocess);
}

#[test]
fn test_config_grouped_keyword() {
    let json = r#"{"keywords": ["N(o|0)v", "Mean"]}"#;
    let config = EngineConfig::from_json_str(json).unwrap();
    let corrector = Corrector::new(&config).unwrap();
    assert_eq!(corrector.correct("N0v. 12 13").unwrap().record.label, "N0v");
    assert_eq!(corrector.correct("Mean 12 13").unwrap().record.label, "Mean");
}

#[test]
fn test_config_overrides_keywords() {
    let json = r#"{"keywords": ["Total"]}"#;
    let config = EngineConfig::from_json_str(json).unwrap();
    let corrector = Corrector::new(&config).unwrap();
    assert_eq!(corrector.correct("Total 12").unwrap().record.label, "Total");
    assert_eq!(corrector.correct("Jan 12").unwrap().record.label, FALLBACK_LABEL);
}
