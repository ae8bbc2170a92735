//! gridlint_engine - formula fingerprinting and rectangle clustering.

pub mod engine;
