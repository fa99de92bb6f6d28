#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_syntax::ParserConfig;
use strata_syntax::pipeline;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // First byte picks the chunk size so split points get fuzzed too.
        let size = data.first().map_or(1, |b| usize::from(*b % 16) + 1);
        let config = ParserConfig::default().with_chunk_size(size);
        let whole = pipeline::terms("fuzz", s, &ParserConfig::default());
        let chunked = pipeline::terms("fuzz", s, &config);
        assert!(whole.is_ok(), "pipeline contract error: {whole:?}");
        assert_eq!(whole, chunked, "term stream depends on chunking");
    }
});
