//! Integration test suite.
//!
//! 1. CRUD behavior and the documented walkthrough scenarios
//! 2. Persistence through the file backend and both codecs
//! 3. Shared-key hazards between store handles
//! 4. Generated-input properties of the codecs and of `add`

pub mod concurrency_tests;
pub mod helpers;
pub mod persistence_tests;
pub mod property_tests;
