//! Default partition list for a full harvest.
//!
//! One entry per OAI set the endpoint exposes. The physics archive only
//! exists as per-subject subsets, hence the `physics:` prefixed entries.

/// Every top-level arXiv set, harvested in this order.
pub const DEFAULT_SETS: [&str; 21] = [
    "eess",
    "econ",
    "math",
    "cs",
    "physics",
    "physics:astro-ph",
    "physics:cond-mat",
    "physics:gr-qc",
    "physics:hep-ex",
    "physics:hep-lat",
    "physics:hep-ph",
    "physics:hep-th",
    "physics:math-ph",
    "physics:nlin",
    "physics:nucl-ex",
    "physics:nucl-th",
    "physics:physics",
    "physics:quant-ph",
    "q-bio",
    "q-fin",
    "stat",
];
