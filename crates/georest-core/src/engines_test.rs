use super::*;

fn parse(yaml: &str) -> Result<EnginesFile, ConfigError> {
    let file: EnginesFile = serde_yaml::from_str(yaml)?;
    validate_engines(&file)?;
    Ok(file)
}

#[test]
fn engine_key_categories() {
    assert_eq!(EngineKey::Orders.category(), Category::Orders);
    assert_eq!(EngineKey::OrdersPrefix.category(), Category::Orders);
    assert_eq!(EngineKey::Couriers.category(), Category::Couriers);
    assert_eq!(EngineKey::Regions.category(), Category::Regions);
}

#[test]
fn engine_key_display_matches_serde_name() {
    let yaml = serde_yaml::to_string(&EngineKey::OrdersPrefix).unwrap();
    assert_eq!(yaml.trim(), EngineKey::OrdersPrefix.to_string());
}

#[test]
fn fuzziness_accepts_auto_numbers_and_numeric_strings() {
    let auto: Fuzziness = serde_yaml::from_str("AUTO").unwrap();
    let lower: Fuzziness = serde_yaml::from_str("auto").unwrap();
    let number: Fuzziness = serde_yaml::from_str("2").unwrap();
    let text: Fuzziness = serde_yaml::from_str("'1'").unwrap();
    assert_eq!(auto, Fuzziness::Auto);
    assert_eq!(lower, Fuzziness::Auto);
    assert_eq!(number, Fuzziness::Edits(2));
    assert_eq!(text, Fuzziness::Edits(1));
}

#[test]
fn fuzziness_rejects_garbage() {
    assert!(serde_yaml::from_str::<Fuzziness>("lots").is_err());
}

#[test]
fn fuzziness_serializes_as_backend_parameter() {
    assert_eq!(
        serde_json::to_value(Fuzziness::Auto).unwrap(),
        serde_json::json!("AUTO")
    );
    assert_eq!(
        serde_json::to_value(Fuzziness::Edits(1)).unwrap(),
        serde_json::json!("1")
    );
}

#[test]
fn parses_all_engine_kinds() {
    let yaml = r"
engines:
  - key: couriers
    engine:
      completion:
        index: couriers
        field: suggestions
        fuzziness: AUTO
        limit: 15
  - key: orders
    engine:
      fuzzy-match:
        index: orders
        field: destination.address
        fuzziness: 1
        threshold: 5
        limit: 15
  - key: regions
    engine:
      region-search:
        tags: ['place:city']
        kinds: [R]
        limit: 10
";
    let file = parse(yaml).expect("valid engines file");
    assert_eq!(file.engines.len(), 3);
    assert_eq!(file.engines[0].key, EngineKey::Couriers);
    match &file.engines[0].engine {
        EngineSettings::Completion(spec) => {
            assert_eq!(spec.fuzziness, Some(Fuzziness::Auto));
            assert_eq!(spec.min_length, 0);
        }
        other => panic!("expected completion, got {other:?}"),
    }
    match &file.engines[1].engine {
        EngineSettings::FuzzyMatch(spec) => {
            assert_eq!(spec.fuzziness, Fuzziness::Edits(1));
            assert_eq!(spec.threshold, 5);
        }
        other => panic!("expected fuzzy-match, got {other:?}"),
    }
}

#[test]
fn rejects_duplicate_keys() {
    let yaml = r"
engines:
  - key: regions
    engine:
      region-search: { kinds: [R], limit: 5 }
  - key: regions
    engine:
      region-search: { kinds: [N], limit: 5 }
";
    let err = parse(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
}

#[test]
fn rejects_zero_limit() {
    let yaml = r"
engines:
  - key: couriers
    engine:
      completion: { index: couriers, field: suggestions, limit: 0 }
";
    let err = parse(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("limit 0")));
}

#[test]
fn rejects_region_engine_without_kinds() {
    let yaml = r"
engines:
  - key: regions
    engine:
      region-search: { kinds: [], limit: 5 }
";
    assert!(matches!(parse(yaml), Err(ConfigError::Validation(_))));
}

#[test]
fn rejects_empty_registry() {
    assert!(matches!(
        parse("engines: []"),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn default_engines_pass_validation() {
    let defaults = default_engines("couriers", "orders");
    validate_engines(&defaults).expect("defaults must be valid");
    let keys: Vec<EngineKey> = defaults.engines.iter().map(|e| e.key).collect();
    assert_eq!(
        keys,
        vec![
            EngineKey::Orders,
            EngineKey::Couriers,
            EngineKey::OrdersPrefix,
            EngineKey::Regions
        ]
    );
}

#[test]
fn load_engines_reports_missing_file() {
    let err = load_engines(Path::new("/definitely/not/here/engines.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::EnginesFileIo { .. }));
}

#[test]
fn shipped_registry_loads_as_built_in_engines() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/engines.yaml");
    let file = load_engines(&path).expect("shipped engines.yaml must load");
    assert_eq!(file, default_engines("couriers", "orders"));
}

#[test]
fn serialized_registry_reads_back_unchanged() {
    let defaults = default_engines("couriers", "orders");
    let yaml = serde_yaml::to_string(&defaults).unwrap();
    assert!(yaml.contains("fuzzy-match:"), "nested-map form expected:\n{yaml}");
    assert!(!yaml.contains('!'), "no YAML tags expected:\n{yaml}");
    assert_eq!(parse(&yaml).unwrap(), defaults);
}

#[test]
fn unknown_engine_kind_is_a_parse_error() {
    let yaml = r"
engines:
  - key: couriers
    engine:
      telepathy: { index: couriers, limit: 5 }
";
    assert!(matches!(parse(yaml), Err(ConfigError::EnginesFileParse(_))));
}

fn index_of(file: &EnginesFile, key: EngineKey) -> Option<&str> {
    let spec = file.engines.iter().find(|spec| spec.key == key)?;
    match &spec.engine {
        EngineSettings::Completion(c) => Some(&c.index),
        EngineSettings::FuzzyMatch(m) => Some(&m.index),
        EngineSettings::RegionSearch(_) => None,
    }
}

#[test]
fn override_indexes_follows_engine_category() {
    let mut file = default_engines("couriers", "orders");
    file.override_indexes(Some("couriers-v2"), Some("orders-v2"));

    assert_eq!(index_of(&file, EngineKey::Couriers), Some("couriers-v2"));
    assert_eq!(index_of(&file, EngineKey::Orders), Some("orders-v2"));
    assert_eq!(index_of(&file, EngineKey::OrdersPrefix), Some("orders-v2"));
    assert_eq!(index_of(&file, EngineKey::Regions), None);
    validate_engines(&file).unwrap();
}

#[test]
fn override_indexes_without_values_keeps_registry() {
    let mut file = default_engines("couriers", "orders");
    file.override_indexes(None, Some("orders-v2"));

    assert_eq!(index_of(&file, EngineKey::Couriers), Some("couriers"));
    assert_eq!(index_of(&file, EngineKey::OrdersPrefix), Some("orders-v2"));
}
