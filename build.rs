use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;
use std::{env, fs};

/// Compile-time capacities, each overridable with `SMOLRPL_<NAME>=<value>`.
static CONFIGS: &[(&str, usize)] = &[
    ("RPL_METRIC_POOL_SIZE", 6),
    ("RPL_MAX_METRICS", 6),
    ("RPL_MAX_INSTANCES", 1),
    ("RPL_PARENTS_BUFFER_COUNT", 8),
    ("RPL_ROUTE_TABLE_SIZE", 16),
    ("RPL_NEIGHBOR_CACHE_SIZE", 16),
    ("RPL_MAX_ADDRESS_COUNT", 4),
    ("RPL_MAX_MESSAGE_LEN", 256),
];

const PREFIX: &str = "SMOLRPL_";

fn main() {
    let mut configs: BTreeMap<&str, usize> = CONFIGS.iter().copied().collect();

    for (name, value) in configs.iter_mut() {
        let var = format!("{PREFIX}{name}");
        println!("cargo:rerun-if-env-changed={var}");

        if let Ok(raw) = env::var(&var) {
            *value = raw
                .parse()
                .unwrap_or_else(|_| panic!("{var} must be an unsigned integer, got {raw:?}"));
        }
    }

    if configs["RPL_METRIC_POOL_SIZE"] == 0 || configs["RPL_MAX_INSTANCES"] == 0 {
        panic!("{PREFIX}RPL_METRIC_POOL_SIZE and {PREFIX}RPL_MAX_INSTANCES must be non-zero");
    }

    let mut data = String::new();
    for (name, value) in &configs {
        writeln!(data, "pub const {name}: usize = {value};").unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::write(out_dir.join("config.rs"), data).unwrap();
    println!("cargo:rerun-if-changed=build.rs");
}
