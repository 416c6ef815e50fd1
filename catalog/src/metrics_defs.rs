//! Metrics definitions for the catalog.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "catalog.cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of catalog reads served from the cache",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "catalog.cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of catalog reads that had to go upstream",
};

pub const UPSTREAM_REQUEST_DURATION: MetricDef = MetricDef {
    name: "upstream.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete a single upstream request in seconds",
};

pub const UPSTREAM_REQUEST_FAILED: MetricDef = MetricDef {
    name: "upstream.request.failed",
    metric_type: MetricType::Counter,
    description: "Number of upstream requests that failed for any reason",
};

pub const PEOPLE_PAGES_FETCHED: MetricDef = MetricDef {
    name: "upstream.people.pages",
    metric_type: MetricType::Histogram,
    description: "Number of pages fetched to assemble the people listing",
};

pub const ACCESS_DENIED: MetricDef = MetricDef {
    name: "catalog.access.denied",
    metric_type: MetricType::Counter,
    description: "Number of sub-resource reads rejected by the person access guard",
};

pub const ALL_METRICS: &[MetricDef] = &[
    CACHE_HIT,
    CACHE_MISS,
    UPSTREAM_REQUEST_DURATION,
    UPSTREAM_REQUEST_FAILED,
    PEOPLE_PAGES_FETCHED,
    ACCESS_DENIED,
];
