//! Build metadata generated by the build script

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Service API version from `package.metadata.service_api_version`
pub fn get_api_version() -> u32 {
    SERVICE_API_VERSION.parse().unwrap_or(20261019)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line version banner for `queuegate version`
pub fn version_line() -> String {
    format!(
        "{} {} (api {}, {} built {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        get_api_version(),
        git_hash(),
        build_time()
    )
}
