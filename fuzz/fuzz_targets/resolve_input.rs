//! Fuzz target for repository input resolution.
//!
//! Feeds arbitrary UTF-8 strings (bare ids and URLs alike) to the resolver
//! and checks the subpath shape of every successful result.

#![no_main]

use hubfetch::hub::resolve;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(reference) = resolve(input) {
        let subpath = reference.subpath;
        assert!(subpath.is_empty() || subpath.ends_with('/'));
        assert!(!subpath.starts_with('/'));
        assert!(!subpath.contains("//"));
    }
});
