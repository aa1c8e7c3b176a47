use sakura_wasm::error::EffectError;

#[test]
fn absent_element_names_its_selector() {
    let lookup: Option<u32> = None;
    let err = EffectError::require(lookup, "#particleCanvas").unwrap_err();
    assert_eq!(err, EffectError::MissingElement("#particleCanvas".into()));
    assert_eq!(err.to_string(), "missing page element: #particleCanvas");
}

#[test]
fn present_element_passes_through() {
    assert_eq!(EffectError::require(Some(7), "#sakura"), Ok(7));
}

#[test]
fn every_outcome_is_distinct() {
    let outcomes = [
        EffectError::MissingElement("x".into()),
        EffectError::GraphicsUnavailable("x".into()),
        EffectError::LookupFailed("x".into()),
        EffectError::PlaybackRejected("x".into()),
        EffectError::StorageUnavailable("x".into()),
    ];
    for (i, a) in outcomes.iter().enumerate() {
        for b in &outcomes[i + 1..] {
            assert_ne!(a, b);
            assert_ne!(a.to_string(), b.to_string());
        }
    }
}
