use std::path::Path;

use super::*;

fn brand(name: &str) -> BrandConfig {
    BrandConfig {
        name: name.to_string(),
        industry: None,
        aliases: vec![],
        competitors: vec![],
    }
}

#[test]
fn slug_simple_name() {
    assert_eq!(brand("High Rise").slug(), "high-rise");
}

#[test]
fn slug_special_characters() {
    assert_eq!(brand("Uncle Arnie's").slug(), "uncle-arnies");
}

#[test]
fn slug_accented_characters() {
    // Non-ASCII chars are stripped; no dash inserted between adjacent ASCII chars
    assert_eq!(brand("BRĒZ").slug(), "brz");
}

#[test]
fn to_profile_trims_names_and_defaults_industry() {
    let config = BrandConfig {
        name: " Acme ".to_string(),
        industry: None,
        aliases: vec![" Acme Corp".to_string()],
        competitors: vec!["Globex ".to_string()],
    };
    let profile = config.to_profile(3);
    assert_eq!(profile.id, 3);
    assert_eq!(profile.name, "Acme");
    assert_eq!(profile.industry, "");
    assert_eq!(profile.aliases, vec!["Acme Corp".to_string()]);
    assert_eq!(profile.competitors, vec!["Globex".to_string()]);
}

#[test]
fn validate_rejects_empty_name() {
    let brands_file = BrandsFile {
        brands: vec![brand("  ")],
        prompts: vec![],
    };
    let err = validate_brands(&brands_file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_name() {
    let brands_file = BrandsFile {
        brands: vec![brand("Acme"), brand("acme")],
        prompts: vec![],
    };
    let err = validate_brands(&brands_file).unwrap_err();
    assert!(err.to_string().contains("duplicate brand name"));
}

#[test]
fn validate_rejects_duplicate_slug() {
    let brands_file = BrandsFile {
        brands: vec![brand("High Rise"), brand("High--Rise")],
        prompts: vec![],
    };
    let err = validate_brands(&brands_file).unwrap_err();
    assert!(err.to_string().contains("duplicate brand"));
}

#[test]
fn validate_rejects_self_competitor() {
    let mut acme = brand("Acme");
    acme.competitors = vec!["ACME".to_string()];
    let brands_file = BrandsFile {
        brands: vec![acme],
        prompts: vec![],
    };
    let err = validate_brands(&brands_file).unwrap_err();
    assert!(err.to_string().contains("itself"));
}

#[test]
fn validate_rejects_blank_alias() {
    let mut acme = brand("Acme");
    acme.aliases = vec![" ".to_string()];
    let brands_file = BrandsFile {
        brands: vec![acme],
        prompts: vec![],
    };
    assert!(validate_brands(&brands_file).is_err());
}

#[test]
fn parse_brands_reads_prompts_with_active_default() {
    let yaml = r"
brands:
  - name: Acme
    industry: CRM
    aliases: [Acme Corp]
    competitors: [Globex, Initech]
prompts:
  - template: What is the best {category} tool?
  - template: Compare {brand} and {competitor}.
    active: false
";
    let file = parse_brands(yaml).unwrap();
    let profiles = file.profiles();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].id, 1);
    assert_eq!(profiles[0].competitors.len(), 2);

    let prompts = file.prompt_list();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].id, 1);
    assert!(prompts[0].active);
    assert!(!prompts[1].active);
}

#[test]
fn load_brands_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("brands.yaml");
    assert!(
        path.exists(),
        "brands.yaml missing at {path:?}; required for this test"
    );
    let result = load_brands(&path);
    assert!(result.is_ok(), "failed to load brands.yaml: {result:?}");
    let brands_file = result.unwrap();
    assert!(!brands_file.brands.is_empty());
    assert!(!brands_file.prompts.is_empty());
}

#[test]
fn load_brands_reports_missing_file() {
    let err = load_brands(Path::new("/nonexistent/brands.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BrandsFileIo { .. }));
}
