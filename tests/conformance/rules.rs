use super::common::{check, check_at};
use fieldrules::{BuiltinRule, DataSource, Rule, RuleErrorKind, RuleKind, RuleRegistry};
use serde_json::{Value, json};

async fn passes(rule: &str, params: &[&str], value: Value) -> bool {
    check(rule, params, value).await.unwrap()
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[test]
fn every_kind_is_registered_under_its_name() {
    let registry = RuleRegistry::with_builtins();
    for kind in RuleKind::ALL {
        assert!(registry.has(kind.as_str()), "{} missing", kind);
        assert_eq!(RuleKind::from_name(kind.as_str()), Some(kind));
        assert_eq!(
            registry.default_message(kind.as_str()),
            Some(kind.default_message())
        );
    }
    assert_eq!(RuleKind::from_name("no_such_rule"), None);
}

#[test]
fn password_defaults_its_bounds() {
    let rule = BuiltinRule::new(RuleKind::Password, vec![]);
    assert_eq!(rule.parameters(), ["8", "32"]);
    let rule = BuiltinRule::new(RuleKind::Password, vec!["4".into(), "6".into()]);
    assert_eq!(rule.parameters(), ["4", "6"]);
}

// ─── Requiredness ────────────────────────────────────────────────────────────

#[tokio::test]
async fn required_rejects_every_kind_of_empty() {
    for empty in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
        assert!(!passes("required", &[], empty.clone()).await, "{:?}", empty);
    }
    assert!(!check_at("field", "required", &[], None, json!({})).await.unwrap());
    for present in [json!(0), json!(false), json!("x"), json!([1]), json!({"k": 1})] {
        assert!(passes("required", &[], present.clone()).await, "{:?}", present);
    }
}

#[tokio::test]
async fn required_with_follows_the_referenced_field() {
    let other_set = json!({"phone": "555"});
    let other_empty = json!({"phone": ""});
    assert!(!check_at("ext", "required_with", &["@phone"], None, other_set.clone()).await.unwrap());
    assert!(check_at("ext", "required_with", &["@phone"], Some(json!("12")), other_set).await.unwrap());
    assert!(check_at("ext", "required_with", &["@phone"], None, other_empty).await.unwrap());
}

#[tokio::test]
async fn required_without_inverts_the_condition() {
    assert!(!check_at("email", "required_without", &["@phone"], None, json!({})).await.unwrap());
    assert!(check_at("email", "required_without", &["@phone"], None, json!({"phone": "555"})).await.unwrap());
}

#[tokio::test]
async fn conditional_rules_require_a_reference() {
    for rule in ["required_with", "required_without", "required_when", "required_unless"] {
        let err = check(rule, &["phone"], json!(null)).await.unwrap_err();
        assert_eq!(err.kind, RuleErrorKind::InvalidParameter, "{}", rule);
        assert_eq!(err.rule, rule);
        let err = check(rule, &[], json!(null)).await.unwrap_err();
        assert_eq!(err.kind, RuleErrorKind::InvalidParameter, "{}", rule);
    }
}

#[tokio::test]
async fn required_when_compares_loosely() {
    let company = json!({"type": "company", "count": 5});
    assert!(!check_at("vat", "required_when", &["@type", "company"], None, company.clone()).await.unwrap());
    assert!(check_at("vat", "required_when", &["@type", "person"], None, company.clone()).await.unwrap());
    assert!(!check_at("vat", "required_when", &["@count", "5"], Some(json!("")), company).await.unwrap());
}

#[tokio::test]
async fn required_unless_reads_flags() {
    let root = json!({"current": "1"});
    assert!(check_at("end", "required_unless", &["@current", "true"], None, root).await.unwrap());
    let root = json!({"current": false});
    assert!(!check_at("end", "required_unless", &["@current", "true"], None, root).await.unwrap());
}

#[tokio::test]
async fn unresolvable_references_do_not_constrain() {
    let root = json!({"skills": [{"x": "set"}]});
    assert!(
        check_at("jobs.0.end", "required_with", &["@skills.*.x"], None, root.clone())
            .await
            .unwrap()
    );
    assert!(
        check_at("jobs.0.end", "same_as", &["@skills.*.x"], Some(json!("other")), root)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn same_as_resolves_references_and_literals() {
    let root = json!({"password": "secret", "n": 5});
    assert!(check_at("confirm", "same_as", &["@password"], Some(json!("secret")), root.clone()).await.unwrap());
    assert!(!check_at("confirm", "same_as", &["@password"], Some(json!("guess")), root.clone()).await.unwrap());
    assert!(check_at("confirm", "same_as", &["@n"], Some(json!("5")), root).await.unwrap());
    assert!(passes("same_as", &["yes"], json!("yes")).await);
    assert!(passes("same_as", &["yes"], json!("")).await);
}

// ─── Numbers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn number_and_integer() {
    assert!(passes("number", &[], json!("12.5")).await);
    assert!(passes("number", &[], json!(-3)).await);
    assert!(!passes("number", &[], json!("abc")).await);
    assert!(passes("number", &[], json!("")).await);
    assert!(passes("integer", &[], json!(3)).await);
    assert!(passes("integer", &[], json!("4")).await);
    assert!(!passes("integer", &[], json!(3.5)).await);
}

#[tokio::test]
async fn comparisons_against_literals() {
    assert!(passes("gt", &["3"], json!(5)).await);
    assert!(!passes("gt", &["5"], json!(5)).await);
    assert!(passes("gte", &["5"], json!("5")).await);
    assert!(passes("lt", &["10"], json!(9.5)).await);
    assert!(!passes("lte", &["1"], json!(2)).await);
    assert!(!passes("gt", &["1"], json!("abc")).await);
    assert!(passes("gt", &["1"], json!(null)).await);
}

#[tokio::test]
async fn comparisons_against_references() {
    let root = json!({"min": 10});
    assert!(!check_at("qty", "gt", &["@min"], Some(json!(5)), root.clone()).await.unwrap());
    assert!(check_at("qty", "gt", &["@min"], Some(json!(11)), root).await.unwrap());
}

#[tokio::test]
async fn comparison_configuration_errors() {
    let err = check("gt", &[], json!(5)).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::MissingParameter);
    assert_eq!(err.message, "Validator requires a comparison value");

    let err = check("lte", &["many"], json!(5)).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::InvalidParameter);
    assert_eq!(err.message, "Validator requires a valid number for comparison");
}

// ─── Strings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lengths_count_characters() {
    assert!(!passes("min_length", &["3"], json!("ab")).await);
    assert!(passes("min_length", &["3"], json!("abc")).await);
    assert!(passes("max_length", &["3"], json!("héé")).await);
    assert!(!passes("max_length", &["2"], json!("abc")).await);
    assert!(passes("max_length", &["2"], json!(12)).await);
    assert!(passes("max_length", &["1"], json!(5.0)).await);
    assert!(!passes("min_length", &["2"], json!(5.0)).await);
    let err = check("min_length", &[], json!("abc")).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::MissingParameter);
}

#[tokio::test]
async fn starts_with_and_contains() {
    assert!(passes("starts_with", &["ab"], json!("abc")).await);
    assert!(!passes("starts_with", &["bc"], json!("abc")).await);
    assert!(passes("contains", &["b"], json!("abc")).await);
    let root = json!({"needle": "zz"});
    assert!(!check_at("hay", "contains", &["@needle"], Some(json!("abc")), root).await.unwrap());
}

#[tokio::test]
async fn format_rules() {
    assert!(passes("email", &[], json!("ada@example.com")).await);
    assert!(!passes("email", &[], json!("ada.example.com")).await);
    assert!(passes("url", &[], json!("https://example.com/path?q=1")).await);
    assert!(passes("url", &[], json!("www.example.org")).await);
    assert!(!passes("url", &[], json!("not a url")).await);
    assert!(passes("alpha", &[], json!("abc")).await);
    assert!(!passes("alpha", &[], json!("ab1")).await);
    assert!(passes("alpha_numeric", &[], json!("ab1")).await);
    assert!(!passes("alpha_numeric", &[], json!("ab-1")).await);
    assert!(passes("slug", &[], json!("my-slug_1")).await);
    assert!(!passes("slug", &[], json!("my slug")).await);
}

#[tokio::test]
async fn matches_compiles_its_pattern() {
    assert!(passes("matches", &[r"^\d{3}$"], json!("123")).await);
    assert!(!passes("matches", &[r"^\d{3}$"], json!("1234")).await);
    let err = check("matches", &["("], json!("x")).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::InvalidPattern);
    assert!(err.message.starts_with("Invalid regular expression pattern"));
}

#[tokio::test]
async fn matches_reuses_the_compiled_pattern() {
    let rule = BuiltinRule::new(RuleKind::Matches, vec![r"^[a-z]+-\d+$".into()]);
    let root = fieldrules::PlainDataSource::default();
    for (value, expected) in [("abc-1", true), ("abc", false), ("x-42", true)] {
        let outcome = rule.validate(Some(&json!(value)), "code", &root).await;
        assert_eq!(outcome, Ok(expected), "{value}");
    }
    assert_eq!(rule, BuiltinRule::new(RuleKind::Matches, vec![r"^[a-z]+-\d+$".into()]));

    let broken = BuiltinRule::new(RuleKind::Matches, vec!["[".into()]);
    for _ in 0..2 {
        let err = broken.validate(Some(&json!("x")), "code", &root).await.unwrap_err();
        assert_eq!(err.kind, RuleErrorKind::InvalidPattern);
    }
    let bare = BuiltinRule::new(RuleKind::Matches, vec![]);
    let err = bare.validate(Some(&json!("x")), "code", &root).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::MissingParameter);
}

#[tokio::test]
async fn list_membership() {
    assert!(passes("in_list", &["red", "green"], json!("red")).await);
    assert!(!passes("in_list", &["red", "green"], json!("blue")).await);
    assert!(passes("in_list", &["1", "2"], json!(2)).await);
    assert!(!passes("not_in_list", &["admin"], json!("admin")).await);
    assert!(passes("not_in_list", &["admin"], json!("ada")).await);
    assert!(passes("not_in_list", &["admin"], json!("")).await);
}

#[tokio::test]
async fn password_policy() {
    assert!(passes("password", &[], json!("Abcdef1!")).await);
    assert!(!passes("password", &[], json!("abcdef1!")).await);
    assert!(!passes("password", &[], json!("Abcdefg!")).await);
    assert!(!passes("password", &[], json!("Abcdefg1")).await);
    assert!(!passes("password", &[], json!("Ab1!")).await);
    assert!(passes("password", &["4", "6"], json!("Ab1!")).await);
    let err = check("password", &["0", "5"], json!("Ab1!")).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::InvalidParameter);
}

// ─── Sequences ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn array_bounds() {
    assert!(!passes("array_min", &["2"], json!([1])).await);
    assert!(passes("array_min", &["2"], json!([1, 2])).await);
    assert!(passes("array_max", &["2"], json!([1, 2])).await);
    assert!(!passes("array_max", &["1"], json!([1, 2])).await);
    assert!(!passes("array_min", &["1"], json!("x")).await);
    let err = check("array_min", &["-1"], json!([1])).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::InvalidParameter);
}

// ─── Dates ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn date_formats() {
    assert!(passes("date", &[], json!("2024-02-29")).await);
    assert!(!passes("date", &[], json!("2023-02-29")).await);
    assert!(!passes("date", &[], json!("2024-1-05")).await);
    assert!(passes("date", &["MM/DD/YYYY"], json!("12/31/2024")).await);
    assert!(!passes("date", &["MM/DD/YYYY"], json!("31/12/2024")).await);
    assert!(passes("date", &["DD-MM-YYYY"], json!("31-12-2024")).await);
    assert!(passes("date", &["whatever"], json!("2024-06-01T10:00:00Z")).await);
    assert!(!passes("date", &["whatever"], json!("tomorrow")).await);
}

#[tokio::test]
async fn date_comparisons() {
    assert!(passes("date_after", &["2024-01-01"], json!("2024-06-01")).await);
    assert!(!passes("date_after", &["2024-01-01"], json!("2023-06-01")).await);
    assert!(passes("date_before", &["now"], json!("2000-01-01")).await);
    assert!(!passes("date_after", &["now"], json!("2000-01-01")).await);
    assert!(!passes("date_after", &["2024-01-01"], json!("garbage")).await);

    let root = json!({"start": "2024-03-01"});
    assert!(check_at("end", "date_after", &["@start"], Some(json!("2024-03-02")), root).await.unwrap());

    let err = check("date_after", &["garbage"], json!("2024-06-01")).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::InvalidParameter);
}

#[tokio::test]
async fn date_between_is_inclusive() {
    let bounds = ["2024-01-01", "2024-12-31"];
    assert!(passes("date_between", &bounds, json!("2024-01-01")).await);
    assert!(passes("date_between", &bounds, json!("2024-12-31")).await);
    assert!(!passes("date_between", &bounds, json!("2025-01-01")).await);
}

#[tokio::test]
async fn age_counts_full_years() {
    assert!(passes("age", &["18"], json!("1990-05-17")).await);
    assert!(!passes("age", &["18"], json!("2999-01-01")).await);
    assert!(!passes("age", &["18"], json!("not a date")).await);
    assert!(check("age", &[], json!("1990-05-17")).await.is_err());
}

// ─── Closure rules ───────────────────────────────────────────────────────────

#[tokio::test]
async fn closure_rules_see_resolved_parameters() {
    let mut registry = RuleRegistry::with_builtins();
    registry.register_fn(
        "divisible_by",
        |value: &Value, params: &[Option<Value>], _path: &str, _data: &dyn DataSource| {
            let divisor = params
                .first()
                .and_then(|p| p.as_ref())
                .and_then(|p| p.as_str().map(str::to_string).or_else(|| Some(p.to_string())))
                .and_then(|p| p.parse::<i64>().ok());
            match (value.as_i64(), divisor) {
                (Some(v), Some(d)) if d != 0 => Ok(v % d == 0),
                _ => Ok(false),
            }
        },
        "{field} must be divisible by {param:0}",
    );

    let rule = registry.get("divisible_by", &["@step".to_string()]).unwrap();
    let root = fieldrules::PlainDataSource::new(json!({"step": 4}));
    assert!(rule.validate(Some(&json!(12)), "n", &root).await.unwrap());
    assert!(!rule.validate(Some(&json!(10)), "n", &root).await.unwrap());
    assert!(rule.validate(None, "n", &root).await.unwrap());
    assert_eq!(rule.parameters(), ["@step"]);
}

#[tokio::test]
async fn closure_failures_are_predicate_errors() {
    let mut registry = RuleRegistry::new();
    registry.register_fn(
        "strict_even",
        |value: &Value, _: &[Option<Value>], path: &str, _: &dyn DataSource| {
            match value.as_i64() {
                Some(n) => Ok(n % 2 == 0),
                None => Err(format!("{} is not a whole number", path)),
            }
        },
        "{field} must be even",
    );

    let rule = registry.get("strict_even", &[]).unwrap();
    let root = fieldrules::PlainDataSource::default();
    assert!(rule.validate(Some(&json!(4)), "n", &root).await.unwrap());
    let err = rule
        .validate(Some(&json!("four")), "n", &root)
        .await
        .unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::Predicate);
    assert_eq!(err.rule, "strict_even");
    assert_eq!(err.message, "n is not a whole number");
}

#[tokio::test]
async fn async_closures_read_the_data_source() {
    let mut registry = RuleRegistry::new();
    registry.register_async_fn(
        "below_limit",
        |value, params, _, data| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                let limit = data.get_value("limits.max").and_then(|v| v.as_f64());
                let floor = params.first().cloned().flatten().and_then(|v| v.as_f64());
                match (value.as_f64(), limit) {
                    (Some(v), Some(max)) => Ok(v < max && floor.is_none_or(|f| v >= f)),
                    _ => Err("no limit configured".to_string()),
                }
            })
        },
        "{field} is over the limit",
    );

    let rule = registry.get("below_limit", &["@limits.min".to_string()]).unwrap();
    let root = fieldrules::PlainDataSource::new(json!({"limits": {"min": 2, "max": 10}}));
    assert!(rule.validate(Some(&json!(5)), "n", &root).await.unwrap());
    assert!(!rule.validate(Some(&json!(12)), "n", &root).await.unwrap());
    assert!(!rule.validate(Some(&json!(1)), "n", &root).await.unwrap());

    let bare = fieldrules::PlainDataSource::default();
    let err = rule.validate(Some(&json!(5)), "n", &bare).await.unwrap_err();
    assert_eq!(err.kind, RuleErrorKind::Predicate);
}
