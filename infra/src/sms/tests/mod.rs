//! Tests for SMS routers, the rate-limited decorator and chain assembly

mod mocks;
mod ratelimit_tests;
mod router_tests;
