pub mod mocks;

#[allow(unused_imports)]
pub use mocks::MockSource;

/// Routes `log` output through the test harness; safe to call from every test.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
