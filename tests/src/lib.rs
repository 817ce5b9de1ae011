//! This crate defines the tests of the attributes of the `dbc` crate.
//!
//! These are defined in a different crate, because otherwise `proc-macro-crate` does not work
//! properly.

#[cfg(test)]
mod contract;
#[cfg(test)]
mod invariant;

#[cfg(test)]
mod tests {
    #[test]
    fn pass() {
        let t = trybuild::TestCases::new();
        t.pass("pass/*.rs");
    }
}
