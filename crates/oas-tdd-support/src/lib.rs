//! Safe unwrap replacements for tests.
//!
//! These helpers are panic-on-failure extractors that are acceptable in
//! tests, where the workspace policy otherwise denies `unwrap()` and
//! `expect()`.

#![allow(clippy::panic)]

/// Extract the value from a Result, or panic with the error.
#[track_caller]
pub fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("unexpected Err: {e:?}"),
    }
}

/// Extract the value from an Option, or panic.
#[track_caller]
pub fn must_some<T>(o: Option<T>) -> T {
    match o {
        Some(v) => v,
        None => panic!("unexpected None"),
    }
}

/// Extract the error from a Result, or panic if Ok.
#[track_caller]
pub fn must_err<T: std::fmt::Debug, E>(r: Result<T, E>) -> E {
    match r {
        Err(e) => e,
        Ok(v) => panic!("expected Err, got Ok({:?})", v),
    }
}
