#![no_main]

use fieldrules::datasource::read_path;
use fieldrules::path;
use fieldrules::validate::expand_pattern;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the split between the path and the JSON document.
    let split = data[0] as usize % data.len();
    let (path_bytes, value_bytes) = data[1..].split_at(split.min(data.len() - 1));
    let p = String::from_utf8_lossy(path_bytes);

    let _ = path::split(&p);
    let _ = path::parent(&p);
    let _ = path::array_info(&p);
    let _ = path::wildcard_indices(&p);
    let _ = path::resolve_reference_path(&p, &p);

    let bracketed = path::dot_to_bracket(&p);
    let _ = path::bracket_to_dot(&bracketed);

    if let Some(pattern) = path::parent(&p) {
        let _ = path::matches_pattern(&p, pattern);
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) {
        let _ = read_path(&value, &p);
        // Wildcards multiply; cap the fan-out.
        if p.matches('*').count() <= 3 {
            let _ = expand_pattern(&p, &value);
        }
    }
});
