//! Integration tests for validator configuration loading

use std::io::Write;

use query_params::prelude::*;

#[test]
fn test_load_config_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
destinationKey: parsedQueryParams
policyOverrides:
  abortEarly: false
  stripUnknown: true
"#
    )
    .unwrap();

    let config = ValidatorConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
    let validator = create(QuerySchema::new(), &config);

    assert_eq!(validator.destination_key(), "parsedQueryParams");
    assert!(!validator.policy().abort_early);
    assert!(validator.policy().strip_unknown);
    assert!(!validator.policy().allow_unknown);
    assert!(validator.policy().no_defaults);
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(ValidatorConfig::from_yaml_file("/nonexistent/query-params.yaml").is_err());
}

#[test]
fn test_overrides_merge_over_defaults() {
    let config = ValidatorConfig::from_yaml_str("policyOverrides:\n  noDefaults: false\n").unwrap();
    let policy = config.policy();

    assert!(!policy.no_defaults);
    assert_eq!(
        policy,
        ValidationPolicy {
            no_defaults: false,
            ..ValidationPolicy::default()
        }
    );
}

#[tokio::test]
async fn test_loaded_config_drives_validation() {
    let config = ValidatorConfig::from_yaml_str(
        r#"
policyOverrides:
  presence: optional
  noDefaults: false
"#,
    )
    .unwrap();
    let schema = QuerySchema::new()
        .field("page", FieldSchema::integer().default(1))
        .field("q", FieldSchema::string());
    let validator = create(schema, &config);

    let value = validator.validate(RawQuery::parse("q=rust")).await.unwrap();
    assert_eq!(value, json!({"page": 1, "q": "rust"}));

    let value = validator.validate(RawQuery::default()).await.unwrap();
    assert_eq!(value, json!({"page": 1}));
}
