//! Fuzz target for URL path classification (the part after `owner/name`).

#![no_main]

use hubfetch::hub::resolve::fuzz_classify_path;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_classify_path(path);
});
