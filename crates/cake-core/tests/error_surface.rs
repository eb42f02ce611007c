use cake_core::errors::{CakeError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("agent", 2)
        .with_context("position", 0.25)
}

#[test]
fn range_error_surface() {
    let err = CakeError::InvalidRange(sample_info("R001", "end beyond cake"));
    assert_eq!(err.info().code, "R001");
    assert_eq!(err.info().context.get("agent").map(String::as_str), Some("2"));
}

#[test]
fn division_error_surface() {
    let err = CakeError::InvalidDivision(sample_info("D001", "cuts out of order"));
    assert_eq!(err.info().code, "D001");
    assert!(err.to_string().starts_with("invalid division"));
}

#[test]
fn invariant_error_surface() {
    let err = CakeError::Invariant(sample_info("I001", "no feasible matching").with_hint("report"));
    assert_eq!(err.info().hint.as_deref(), Some("report"));
    assert!(err.to_string().contains("hint: report"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = CakeError::input("bad-agents", "need 3 or 4 agents");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Input");
    assert_eq!(json["detail"]["code"], "bad-agents");
    let back: CakeError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
