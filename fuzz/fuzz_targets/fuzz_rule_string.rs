#![no_main]

use fieldrules::RuleRegistry;
use fieldrules::parse::{parse_config, parse_rule_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let registry = RuleRegistry::with_builtins();
    let mut diagnostics = Vec::new();
    let chain = parse_rule_string("field", input, &registry, &mut diagnostics);
    assert!(chain.len() <= input.split('|').count());

    let _ = parse_config(input);
});
