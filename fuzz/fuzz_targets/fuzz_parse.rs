#![no_main]

use gomod_manifest::{Manifest, ManifestParser};
use libfuzzer_sys::fuzz_target;
use std::panic::AssertUnwindSafe;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = ManifestParser::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)));

        match result {
            Ok(Ok(manifest)) => {
                let canonical = manifest.to_string();
                let reparsed = Manifest::parse(&canonical);
                assert!(
                    reparsed.is_ok(),
                    "canonical text must parse: {canonical:?}"
                );
                assert_eq!(
                    reparsed.ok().as_ref(),
                    Some(&manifest),
                    "canonical text must round-trip"
                );
            }
            Ok(Err(err)) => {
                let position = err.position();
                assert!(
                    position.offset <= content.len(),
                    "error offset must be within input"
                );
                assert!(position.line >= 1, "lines are 1-based");
            }
            Err(_) => panic!("parser panicked"),
        }
    }
});
