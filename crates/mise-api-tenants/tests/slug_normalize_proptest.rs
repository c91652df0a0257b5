//! Property tests for slug normalization.

use mise_api_tenants::services::SlugService;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_output_is_always_a_valid_slug(name in any::<String>()) {
        let slug = SlugService::normalize(&name);
        prop_assert!(SlugService::is_valid_slug(&slug), "invalid slug {:?} from {:?}", slug, name);
    }

    #[test]
    fn prop_normalize_is_deterministic(name in any::<String>()) {
        prop_assert_eq!(SlugService::normalize(&name), SlugService::normalize(&name));
    }

    #[test]
    fn prop_normalize_is_idempotent(name in "\\PC{0,40}") {
        let once = SlugService::normalize(&name);
        prop_assert_eq!(SlugService::normalize(&once), once);
    }

    #[test]
    fn prop_ascii_words_survive(words in prop::collection::vec("[a-z0-9]{3,8}", 1..5)) {
        let name = words.join(" ");
        prop_assert_eq!(SlugService::normalize(&name), words.join("-"));
    }

    #[test]
    fn prop_case_does_not_matter(name in "[A-Za-z ]{0,30}") {
        prop_assert_eq!(
            SlugService::normalize(&name),
            SlugService::normalize(&name.to_uppercase())
        );
    }
}
