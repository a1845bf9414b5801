// Not every test binary uses every double.
#![allow(dead_code)]

pub mod flaky_store;
