#![no_main]

use libfuzzer_sys::fuzz_target;
use vmodel::{KeyVariants, camelize, hyphenate};

fuzz_target!(|key: &str| {
    let variants = KeyVariants::new(key);
    let spellings = variants.spellings();
    assert!(!spellings.is_empty() && spellings.len() <= 3);
    assert_eq!(variants.declared(), key);
    assert_eq!(spellings.len(), variants.update_events().len());
    assert!(variants.matches(&camelize(key)));
    assert!(variants.matches(&hyphenate(key)));
});
