//! Process-wide registration lives for the whole test binary, so it is
//! exercised by a single test in its own binary.

use region_api::{region, RegionConfig};

#[test]
fn first_registration_wins() {
    assert!(region::get().is_none());
    assert!(!region::is_initialized());

    // A failed registration leaves the slot empty.
    assert!(region::configure("not a url", "", "").is_err());
    assert!(region::get().is_none());

    let first = RegionConfig::new("http://region-a:8888")
        .unwrap()
        .with_token("token-a")
        .with_auth_type("token");
    let registered = region::init(&first).unwrap();
    assert_eq!(registered.base_url().as_str(), "http://region-a:8888/");
    assert!(registered.has_token());

    let second = RegionConfig::new("http://region-b:8888").unwrap();
    let again = region::init(&second).unwrap();
    assert!(std::ptr::eq(registered, again));
    assert_eq!(again.base_url().as_str(), "http://region-a:8888/");
    assert_eq!(again.auth_type(), "token");

    let third = region::configure("http://region-c:8888", "", "none").unwrap();
    assert!(std::ptr::eq(registered, third));

    let current = region::get().unwrap();
    assert!(std::ptr::eq(registered, current));
}
