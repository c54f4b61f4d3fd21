#![cfg(test)]

use crate::module_system::version::{VersionError, VersionRange, parse_version};

#[test]
fn test_range_matching() {
    let range = VersionRange::from_constraint("^1.2").unwrap();
    assert!(range.includes(&parse_version("1.9.0").unwrap()));
    assert!(!range.includes(&parse_version("2.0.0").unwrap()));
    assert_eq!(range.constraint_string(), "^1.2");
    assert_eq!(range.to_string(), "^1.2");
}

#[test]
fn test_invalid_inputs() {
    assert!(matches!(
        VersionRange::from_constraint("one point two"),
        Err(VersionError::InvalidConstraint { .. })
    ));
    assert!(parse_version("1.x").is_err());
}

#[test]
fn test_serde_uses_constraint_string() {
    let range: VersionRange = serde_json::from_str(r#"">=0.9, <2""#).unwrap();
    assert_eq!(range, VersionRange::from_constraint(">=0.9, <2").unwrap());
    assert_eq!(serde_json::to_string(&range).unwrap(), r#"">=0.9, <2""#);
}
