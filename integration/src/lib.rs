//! Live-service integration tests for the mvault client.
//!
//! The tests in `tests/` talk to a real Membership Vault and are ignored by
//! default. Run them with `MVAULT_*` credentials set and `--ignored`.
