#![allow(dead_code)]

pub mod mock_provider;

pub use mock_provider::{
    critical_update, pending_update, untagged_update, MockProvider, MockProviderState,
};
