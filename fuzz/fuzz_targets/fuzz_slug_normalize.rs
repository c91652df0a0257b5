//! Fuzz target for business-name slug normalization.
//!
//! Any UTF-8 input must normalize to a valid slug, and normalizing a
//! slug again must not change it.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_slug_normalize -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use mise_api_tenants::services::SlugService;

fuzz_target!(|data: &[u8]| {
    if let Ok(name) = std::str::from_utf8(data) {
        let slug = SlugService::normalize(name);
        assert!(SlugService::is_valid_slug(&slug), "invalid slug {slug:?} from {name:?}");
        assert_eq!(SlugService::normalize(&slug), slug);
    }
});
