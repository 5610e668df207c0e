//! Test fixtures and data for orchestrator tests
//!
//! This module provides consistent request bodies and directory documents
//! used across all test suites.

use serde_json::{json, Value};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Datasources listed in the standard directory
    pub const SITE_1: &'static str = "site1";
    pub const SITE_2: &'static str = "site2";
    pub const SITE_3: &'static str = "site3";

    /// Output of the response stage for structured results
    pub const RESPONSE_OUTPUT: &'static str = "{\"age\": [4, 8, 15]}\n";

    /// Output of the plotting stage
    pub const PLOT_OUTPUT: &'static str = "histogram_4f1c.png\n";

    /// Directory document listing every standard site
    pub fn directory_document() -> Value {
        json!({
            "site1": "10.0.0.1:3000",
            "site2": "10.0.0.2:3000",
            "site3": "10.0.0.3:3000"
        })
    }

    /// Histogram request over one site, non-plot
    pub fn histogram_request() -> Value {
        json!({ "attributes": ["age"], "datasources": [Self::SITE_1] })
    }

    /// Same request with cache lookup disabled
    pub fn uncached_histogram_request() -> Value {
        json!({ "attributes": ["age"], "datasources": [Self::SITE_1], "cache": "NO" })
    }

    /// Histogram request in plot mode
    pub fn plot_request() -> Value {
        json!({ "attributes": [{ "name": "age", "cells": 5 }], "datasources": [Self::SITE_1], "plot": true })
    }

    /// Request over every listed site
    pub fn all_sites_request() -> Value {
        json!({ "attributes": ["age"] })
    }

    /// Request naming a site missing from the directory
    pub fn unknown_site_request() -> Value {
        json!({ "attributes": ["age"], "datasources": [Self::SITE_1, "nowhere"] })
    }
}
